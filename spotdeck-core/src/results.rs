//! Decoders for the structured results of mutating calls.

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// State transition reported for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceStateChange {
    pub instance_id: String,
    pub current_state: String,
}

/// Outcome for one cancelled bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledBid {
    pub request_id: String,
    pub state: String,
}

/// A freshly submitted bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedBid {
    pub request_id: String,
    pub state: String,
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedImage {
    pub image_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireStateChange {
    instance_id: String,
    current_state: WireStateName,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireStateName {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TerminateOutput {
    terminating_instances: Vec<WireStateChange>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CancelOutput {
    cancelled_spot_instance_requests: Vec<WireCancelled>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireCancelled {
    spot_instance_request_id: String,
    state: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RequestSpotOutput {
    spot_instance_requests: Vec<WireSubmitted>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireSubmitted {
    spot_instance_request_id: String,
    state: String,
    spot_price: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateImageOutput {
    image_id: String,
}

fn result<T: DeserializeOwned>(operation: &str, raw: Value) -> Result<T, DecodeError> {
    serde_json::from_value(raw).map_err(|e| DecodeError::ActionResult {
        operation: operation.to_string(),
        reason: e.to_string(),
    })
}

/// Decode `terminate-instances` output.
///
/// Accepts the provider's `TerminatingInstances` list as well as a single
/// bare state-change object.
pub fn decode_terminate(raw: Value) -> Result<Vec<InstanceStateChange>, DecodeError> {
    let changes = if raw.get("TerminatingInstances").is_some() {
        result::<TerminateOutput>("terminate-instances", raw)?.terminating_instances
    } else {
        vec![result::<WireStateChange>("terminate-instances", raw)?]
    };
    Ok(changes
        .into_iter()
        .map(|c| InstanceStateChange {
            instance_id: c.instance_id,
            current_state: c.current_state.name,
        })
        .collect())
}

pub fn decode_cancel(raw: Value) -> Result<Vec<CancelledBid>, DecodeError> {
    let output: CancelOutput = result("cancel-spot-instance-requests", raw)?;
    Ok(output
        .cancelled_spot_instance_requests
        .into_iter()
        .map(|c| CancelledBid {
            request_id: c.spot_instance_request_id,
            state: c.state,
        })
        .collect())
}

pub fn decode_request_spot(raw: Value) -> Result<Vec<SubmittedBid>, DecodeError> {
    let output: RequestSpotOutput = result("request-spot-instances", raw)?;
    if output.spot_instance_requests.is_empty() {
        return Err(DecodeError::ActionResult {
            operation: "request-spot-instances".to_string(),
            reason: "no spot request was created".to_string(),
        });
    }
    Ok(output
        .spot_instance_requests
        .into_iter()
        .map(|r| SubmittedBid {
            request_id: r.spot_instance_request_id,
            state: r.state,
            price: r.spot_price,
        })
        .collect())
}

pub fn decode_create_image(raw: Value) -> Result<CreatedImage, DecodeError> {
    let output: CreateImageOutput = result("create-image", raw)?;
    Ok(CreatedImage {
        image_id: output.image_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_terminate_bare_object() {
        let raw = json!({"InstanceId": "i-1", "CurrentState": {"Name": "shutting-down"}});
        let changes = decode_terminate(raw).unwrap();
        assert_eq!(
            changes,
            vec![InstanceStateChange {
                instance_id: "i-1".to_string(),
                current_state: "shutting-down".to_string(),
            }]
        );
    }

    #[test]
    fn test_decode_terminate_provider_list() {
        let raw = json!({
            "TerminatingInstances": [{
                "InstanceId": "i-1",
                "CurrentState": {"Code": 32, "Name": "shutting-down"},
                "PreviousState": {"Code": 16, "Name": "running"}
            }]
        });
        assert_eq!(decode_terminate(raw).unwrap()[0].current_state, "shutting-down");
    }

    #[test]
    fn test_decode_terminate_rejects_garbage() {
        assert!(decode_terminate(json!({"Nope": 1})).is_err());
    }

    #[test]
    fn test_decode_cancel() {
        let raw = json!({
            "CancelledSpotInstanceRequests": [{"SpotInstanceRequestId": "sir-1", "State": "cancelled"}]
        });
        assert_eq!(decode_cancel(raw).unwrap()[0].state, "cancelled");
    }

    #[test]
    fn test_decode_request_spot_requires_a_request() {
        assert!(decode_request_spot(json!({"SpotInstanceRequests": []})).is_err());
        let raw = json!({
            "SpotInstanceRequests": [{"SpotInstanceRequestId": "sir-7", "State": "open", "SpotPrice": "0.0365"}]
        });
        let bids = decode_request_spot(raw).unwrap();
        assert_eq!(bids[0].request_id, "sir-7");
        assert_eq!(bids[0].price.as_deref(), Some("0.0365"));
    }

    #[test]
    fn test_decode_create_image() {
        let image = decode_create_image(json!({"ImageId": "ami-42"})).unwrap();
        assert_eq!(image.image_id, "ami-42");
    }
}
