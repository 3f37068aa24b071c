//! Operator action dispatch.
//!
//! An encoded command is parsed into an [`ActionRequest`], put to the
//! operator for confirmation, and, once confirmed, becomes the preceding
//! action of a refresh pass. The mutating call itself runs inside that pass
//! via [`execute`], so it is serialized with every other remote call.

use crate::context::Engine;
use crate::gateway::{GatewayCall, Operation};
use crate::pass::RefreshPass;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use spotdeck_core::results::{decode_cancel, decode_create_image, decode_request_spot, decode_terminate};
use spotdeck_core::{
    ActionParseError, ActionRequest, Category, DecodeError, Fragment, Notice, PanelConfig, Row,
    SpotdeckError, Table,
};

/// Result of executing one action inside a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub fragment: Fragment,
    /// Category to refetch on this pass; `None` when the action failed.
    pub invalidate: Option<Category>,
}

impl ActionOutcome {
    pub fn succeeded(&self) -> bool {
        self.invalidate.is_some()
    }
}

/// Parse an encoded command, logging malformed ones.
pub fn parse_action(encoded: &str) -> Result<ActionRequest, ActionParseError> {
    encoded.parse().map_err(|e: ActionParseError| {
        tracing::error!(command = %encoded, error = %e, "malformed action command");
        e
    })
}

/// A parsed action awaiting the operator's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    action: ActionRequest,
}

impl PendingAction {
    pub fn prepare(encoded: &str) -> Result<Self, ActionParseError> {
        Ok(Self {
            action: parse_action(encoded)?,
        })
    }

    pub fn action(&self) -> &ActionRequest {
        &self.action
    }

    pub fn prompt(&self) -> String {
        self.action.prompt()
    }

    pub fn confirm(self) -> RefreshPass {
        tracing::info!(action = %self.action, "action confirmed");
        RefreshPass::after_action(self.action)
    }

    pub fn decline(self) {
        tracing::info!(action = %self.action, "action declined");
    }
}

/// Parse, confirm, and turn an encoded command into a refresh pass.
///
/// Declining yields `Ok(None)`; nothing is called and nothing is invalidated.
pub fn dispatch<F>(encoded: &str, confirm: F) -> Result<Option<RefreshPass>, ActionParseError>
where
    F: FnOnce(&ActionRequest) -> bool,
{
    let pending = PendingAction::prepare(encoded)?;
    if confirm(pending.action()) {
        Ok(Some(pending.confirm()))
    } else {
        pending.decline();
        Ok(None)
    }
}

/// Image name for a snapshot: `<prefix>-<instance type>-<YYYYmmdd-HHMMSS>`.
pub fn snapshot_name(prefix: &str, instance_type: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}-{}", prefix, instance_type, now.format("%Y%m%d-%H%M%S"))
}

/// The single mutating call an action performs.
pub fn action_call(action: &ActionRequest, config: &PanelConfig, now: DateTime<Utc>) -> GatewayCall {
    match action {
        ActionRequest::CancelBid { request_id, .. } => {
            GatewayCall::new(Operation::CancelSpotInstanceRequests)
                .arg("SpotInstanceRequestIds", json!([request_id]))
        }
        ActionRequest::Start {
            instance_type,
            price,
            zone,
            image_id,
            key_name,
            security_group_id,
        } => GatewayCall::new(Operation::RequestSpotInstances)
            .arg("SpotPrice", price.as_str())
            .arg("InstanceCount", 1)
            .arg("Type", "one-time")
            .arg(
                "LaunchSpecification",
                json!({
                    "ImageId": image_id,
                    "KeyName": key_name,
                    "SecurityGroupIds": [security_group_id],
                    "InstanceType": instance_type,
                    "Placement": { "AvailabilityZone": zone },
                }),
            ),
        ActionRequest::Snapshot {
            instance_id,
            instance_type,
            ..
        } => GatewayCall::new(Operation::CreateImage)
            .arg("InstanceId", instance_id.as_str())
            .arg(
                "Name",
                snapshot_name(&config.snapshot_prefix, instance_type, now),
            )
            .arg("NoReboot", true),
        ActionRequest::Terminate { instance_id, .. } => {
            GatewayCall::new(Operation::TerminateInstances).arg("InstanceIds", json!([instance_id]))
        }
    }
}

/// Build the summary table for a successful action.
pub fn result_table(action: &ActionRequest, raw: Value) -> Result<Table, DecodeError> {
    match action {
        ActionRequest::CancelBid { .. } => {
            let mut table = Table::new("Cancelled bids", ["Request", "State"]);
            for bid in decode_cancel(raw)? {
                table.push(Row::new([bid.request_id, bid.state]));
            }
            Ok(table)
        }
        ActionRequest::Start { .. } => {
            let mut table = Table::new("Submitted bids", ["Request", "State", "Price"]);
            for bid in decode_request_spot(raw)? {
                let price = bid.price.unwrap_or_else(|| "-".to_string());
                table.push(Row::new([bid.request_id, bid.state, price]));
            }
            Ok(table)
        }
        ActionRequest::Snapshot { instance_id, .. } => {
            let created = decode_create_image(raw)?;
            let mut table = Table::new("Created images", ["Image", "From"]);
            table.push(Row::new([created.image_id, instance_id.clone()]));
            Ok(table)
        }
        ActionRequest::Terminate { .. } => {
            let mut table = Table::new("Terminated instances", ["Instance", "State"]);
            for change in decode_terminate(raw)? {
                table.push(Row::new([change.instance_id, change.current_state]));
            }
            Ok(table)
        }
    }
}

pub async fn execute(engine: &Engine, action: &ActionRequest) -> ActionOutcome {
    execute_at(engine, action, Utc::now()).await
}

/// Perform the action's mutating call and summarise the result.
pub async fn execute_at(engine: &Engine, action: &ActionRequest, now: DateTime<Utc>) -> ActionOutcome {
    let call = action_call(action, engine.config(), now);
    tracing::info!(action = %action, operation = %call.operation, "executing action");

    let result = match engine.invoke(call).await {
        Ok(raw) => result_table(action, raw).map_err(SpotdeckError::from),
        Err(e) => Err(SpotdeckError::from(e)),
    };

    match result {
        Ok(table) => ActionOutcome {
            fragment: table.into(),
            invalidate: Some(action.invalidates()),
        },
        Err(e) => {
            tracing::warn!(action = %action, error = %e, "action failed");
            ActionOutcome {
                fragment: Notice::error(format!("{} failed: {}", action.command_name(), e)).into(),
                invalidate: None,
            }
        }
    }
}
