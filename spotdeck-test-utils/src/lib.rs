//! SPOTDECK Test Utilities
//!
//! Centralized test infrastructure for the SPOTDECK workspace:
//! - A scripted mock gateway that records every call
//! - Provider-shaped JSON fixtures
//! - Proptest generators for core types

pub use spotdeck_core::{ActionRequest, Category, GatewayError, PanelConfig, PriceSample};
pub use spotdeck_engine::{Gateway, GatewayCall, Operation, RefreshPass};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

// ============================================================================
// MOCK GATEWAY
// ============================================================================

#[derive(Debug, Default)]
struct MockState {
    /// One-shot responses, consumed before the sticky default.
    queued: HashMap<Operation, VecDeque<Result<Value, GatewayError>>>,
    defaults: HashMap<Operation, Value>,
    calls: Vec<GatewayCall>,
}

/// Scripted gateway for tests.
///
/// Clones share state, so a test can hand one clone to the engine and keep
/// another to script responses and inspect the call log.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway answering every read with the standard fixtures.
    pub fn with_fixtures() -> Self {
        let gateway = Self::new();
        gateway.respond(Operation::DescribeInstances, fixtures::instances_payload());
        gateway.respond(
            Operation::DescribeSpotInstanceRequests,
            fixtures::spot_requests_payload(),
        );
        gateway.respond(Operation::DescribeImages, fixtures::images_payload());
        gateway.respond(Operation::DescribeKeyPairs, fixtures::key_pairs_payload());
        gateway.respond(
            Operation::DescribeSecurityGroups,
            fixtures::security_groups_payload(),
        );
        gateway.respond(
            Operation::DescribeSpotPriceHistory,
            fixtures::price_history_payload(),
        );
        gateway
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer `operation` with `value` until told otherwise.
    pub fn respond(&self, operation: Operation, value: Value) {
        self.lock().defaults.insert(operation, value);
    }

    /// Queue a single response for the next call to `operation`.
    pub fn push_response(&self, operation: Operation, response: Result<Value, GatewayError>) {
        self.lock()
            .queued
            .entry(operation)
            .or_default()
            .push_back(response);
    }

    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.push_response(operation, Err(error));
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn calls_for(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn mutating_calls(&self) -> Vec<GatewayCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation.is_mutating())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn invoke(&self, call: GatewayCall) -> Result<Value, GatewayError> {
        let mut state = self.lock();
        let operation = call.operation;
        state.calls.push(call);

        if let Some(response) = state.queued.get_mut(&operation).and_then(VecDeque::pop_front) {
            return response;
        }
        state
            .defaults
            .get(&operation)
            .cloned()
            .ok_or_else(|| GatewayError::CommandFailed {
                operation: operation.name().to_string(),
                status: 255,
                message: "no scripted response".to_string(),
            })
    }
}

/// A gateway failure shaped like a provider-side refusal.
pub fn provider_error(operation: Operation, message: &str) -> GatewayError {
    GatewayError::CommandFailed {
        operation: operation.name().to_string(),
        status: 254,
        message: message.to_string(),
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Provider-shaped payloads and a matching configuration.

    use super::*;
    use serde_json::json;

    /// Configuration whose patterns select exactly the fixture key pair and group.
    pub fn test_config() -> PanelConfig {
        PanelConfig {
            key_pair_pattern: "^deploy$".to_string(),
            security_group_pattern: "^default$".to_string(),
            instance_type_pattern: r"^(t1|m1)\.".to_string(),
            ..PanelConfig::default()
        }
    }

    pub fn instance_json(id: &str, instance_type: &str, address: Option<&str>, state: &str) -> Value {
        let mut instance = json!({
            "InstanceId": id,
            "InstanceType": instance_type,
            "State": { "Code": 16, "Name": state },
            "LaunchTime": "2026-10-18T08:00:00.000Z",
        });
        if let Some(address) = address {
            instance["PublicIpAddress"] = json!(address);
        }
        instance
    }

    pub fn instances_with(instances: Vec<Value>) -> Value {
        json!({ "Reservations": [{ "Instances": instances }] })
    }

    pub fn instances_payload() -> Value {
        instances_with(vec![
            instance_json("i-1", "t1.micro", Some("1.2.3.4"), "running"),
            instance_json("i-2", "m1.small", None, "stopped"),
        ])
    }

    pub fn spot_requests_payload() -> Value {
        json!({
            "SpotInstanceRequests": [
                {
                    "SpotInstanceRequestId": "sir-1",
                    "SpotPrice": "0.0364",
                    "State": "open",
                    "Status": { "Code": "pending-evaluation", "Message": "Your Spot request has been submitted for review" },
                    "LaunchSpecification": { "InstanceType": "m1.xlarge" },
                },
                {
                    "SpotInstanceRequestId": "sir-0",
                    "SpotPrice": "0.0100",
                    "State": "cancelled",
                    "LaunchSpecification": { "InstanceType": "t1.micro" },
                },
            ]
        })
    }

    pub fn images_payload() -> Value {
        json!({
            "Images": [
                { "ImageId": "ami-old", "Name": "spotdeck-old", "CreationDate": "2026-09-01T10:00:00.000Z", "State": "available" },
                { "ImageId": "ami-new", "Name": "spotdeck-new", "CreationDate": "2026-10-01T10:00:00.000Z", "State": "available" },
            ]
        })
    }

    pub fn key_pairs_payload() -> Value {
        json!({ "KeyPairs": [{ "KeyName": "deploy" }, { "KeyName": "laptop" }] })
    }

    pub fn security_groups_payload() -> Value {
        json!({
            "SecurityGroups": [
                { "GroupId": "sg-1", "GroupName": "default" },
                { "GroupId": "sg-2", "GroupName": "web" },
            ]
        })
    }

    pub fn price_entry(instance_type: &str, zone: &str, price: &str) -> Value {
        json!({
            "InstanceType": instance_type,
            "AvailabilityZone": zone,
            "SpotPrice": price,
            "ProductDescription": "Linux/UNIX",
            "Timestamp": "2026-10-18T08:30:00.000Z",
        })
    }

    pub fn price_history_payload() -> Value {
        json!({
            "SpotPriceHistory": [
                price_entry("m1.xlarge", "us-east-1b", "0.033200"),
                price_entry("m1.xlarge", "us-east-1b", "0.033100"),
                price_entry("m1.xlarge", "us-east-1b", "0.033000"),
                price_entry("t1.micro", "us-east-1a", "0.003000"),
                price_entry("c1.medium", "us-east-1a", "0.001000"),
            ]
        })
    }

    pub fn terminate_result(instance_id: &str, state: &str) -> Value {
        json!({ "InstanceId": instance_id, "CurrentState": { "Name": state } })
    }

    pub fn cancel_result(request_id: &str) -> Value {
        json!({
            "CancelledSpotInstanceRequests": [
                { "SpotInstanceRequestId": request_id, "State": "cancelled" }
            ]
        })
    }

    pub fn request_spot_result(request_id: &str, price: &str) -> Value {
        json!({
            "SpotInstanceRequests": [
                { "SpotInstanceRequestId": request_id, "State": "open", "SpotPrice": price }
            ]
        })
    }

    pub fn create_image_result(image_id: &str) -> Value {
        json!({ "ImageId": image_id })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for SPOTDECK types.

    use super::*;
    use proptest::prelude::*;

    /// A token that survives whitespace-delimited encoding.
    pub fn arb_token() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9.\\-]{0,15}"
    }

    pub fn arb_price() -> impl Strategy<Value = String> {
        (1u32..100_000u32).prop_map(|units| format!("{:.4}", units as f64 / 10_000.0))
    }

    pub fn arb_category() -> impl Strategy<Value = Category> {
        prop::sample::select(Category::all().to_vec())
    }

    pub fn arb_action_request() -> impl Strategy<Value = ActionRequest> {
        prop_oneof![
            (arb_token(), arb_token()).prop_map(|(request_id, instance_type)| {
                ActionRequest::CancelBid {
                    request_id,
                    instance_type,
                }
            }),
            (
                arb_token(),
                arb_price(),
                arb_token(),
                arb_token(),
                arb_token(),
                arb_token()
            )
                .prop_map(
                    |(instance_type, price, zone, image_id, key_name, security_group_id)| {
                        ActionRequest::Start {
                            instance_type,
                            price,
                            zone,
                            image_id,
                            key_name,
                            security_group_id,
                        }
                    }
                ),
            (arb_token(), arb_token(), arb_token()).prop_map(
                |(instance_id, instance_type, address)| ActionRequest::Snapshot {
                    instance_id,
                    instance_type,
                    address,
                }
            ),
            (arb_token(), arb_token(), arb_token()).prop_map(
                |(instance_id, instance_type, address)| ActionRequest::Terminate {
                    instance_id,
                    instance_type,
                    address,
                }
            ),
        ]
    }

    pub fn arb_refresh_pass() -> impl Strategy<Value = RefreshPass> {
        (
            prop::option::of(arb_action_request()),
            prop::collection::btree_set(arb_category(), 0..4),
        )
            .prop_map(|(preceding_action, invalidated)| RefreshPass {
                preceding_action,
                invalidated,
            })
    }

    pub fn arb_price_sample() -> impl Strategy<Value = PriceSample> {
        (
            prop::sample::select(vec!["t1.micro", "m1.small", "m1.xlarge", "c1.medium"]),
            prop::sample::select(vec!["us-east-1a", "us-east-1b", "us-east-1c"]),
            1u32..100_000u32,
        )
            .prop_map(|(t, z, p)| PriceSample::new(t, z, p as f64 / 100_000.0))
    }
}
