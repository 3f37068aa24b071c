//! Remote resource records and their decoders.
//!
//! The gateway hands back the provider's JSON documents untouched. Each
//! `decode_*` function projects one document onto the handful of fields the
//! engine inspects; anything else in the payload is ignored. A payload that
//! lacks a required field is a [`DecodeError`], which callers treat exactly
//! like a failed call.

use crate::error::DecodeError;
use crate::Category;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Timestamp = DateTime<Utc>;

// ============================================================================
// RECORDS
// ============================================================================

/// A running compute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub instance_type: String,
    pub public_address: Option<String>,
    pub state: String,
    pub launch_time: Timestamp,
}

/// A pending or fulfilled spot bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotRequest {
    pub id: String,
    pub instance_type: String,
    pub price: String,
    pub state: String,
    pub status_message: Option<String>,
    pub instance_id: Option<String>,
}

/// A machine image owned by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: Option<String>,
    pub creation_date: Timestamp,
    pub description: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
}

/// One observed spot price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub instance_type: String,
    pub zone: String,
    pub price: f64,
    pub timestamp: Option<Timestamp>,
}

impl PriceSample {
    pub fn new(instance_type: impl Into<String>, zone: impl Into<String>, price: f64) -> Self {
        Self {
            instance_type: instance_type.into(),
            zone: zone.into(),
            price,
            timestamp: None,
        }
    }
}

/// Spot request states that still matter to the operator.
pub const LIVE_SPOT_STATES: &[&str] = &["open", "fulfilled"];

pub const RUNNING_STATE: &str = "running";

// ============================================================================
// WIRE SHAPES
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesOutput {
    reservations: Vec<WireReservation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireReservation {
    #[serde(default)]
    instances: Vec<WireInstance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireInstance {
    instance_id: String,
    instance_type: String,
    public_ip_address: Option<String>,
    state: WireState,
    launch_time: Timestamp,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireState {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSpotRequestsOutput {
    spot_instance_requests: Vec<WireSpotRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireSpotRequest {
    spot_instance_request_id: String,
    spot_price: String,
    state: String,
    status: Option<WireStatus>,
    launch_specification: Option<WireLaunchSpecification>,
    instance_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireStatus {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireLaunchSpecification {
    instance_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeImagesOutput {
    images: Vec<WireImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireImage {
    image_id: String,
    name: Option<String>,
    creation_date: Timestamp,
    description: Option<String>,
    state: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeKeyPairsOutput {
    key_pairs: Vec<WireKeyPair>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireKeyPair {
    key_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSecurityGroupsOutput {
    security_groups: Vec<WireSecurityGroup>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireSecurityGroup {
    group_id: String,
    group_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribePriceHistoryOutput {
    spot_price_history: Vec<WirePrice>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WirePrice {
    instance_type: String,
    availability_zone: String,
    spot_price: String,
    timestamp: Option<Timestamp>,
}

fn shape<T: DeserializeOwned>(category: Category, raw: Value) -> Result<T, DecodeError> {
    serde_json::from_value(raw).map_err(|e| DecodeError::Shape {
        category,
        reason: e.to_string(),
    })
}

// ============================================================================
// DECODERS
// ============================================================================

/// Decode `describe-instances` output, keeping running instances only.
pub fn decode_instances(raw: Value) -> Result<Vec<Instance>, DecodeError> {
    let output: DescribeInstancesOutput = shape(Category::Instances, raw)?;
    let mut instances: Vec<Instance> = output
        .reservations
        .into_iter()
        .flat_map(|r| r.instances)
        .filter(|i| i.state.name == RUNNING_STATE)
        .map(|i| Instance {
            id: i.instance_id,
            instance_type: i.instance_type,
            public_address: i.public_ip_address,
            state: i.state.name,
            launch_time: i.launch_time,
        })
        .collect();
    instances.sort_by(|a, b| a.launch_time.cmp(&b.launch_time).then(a.id.cmp(&b.id)));
    Ok(instances)
}

/// Decode `describe-spot-instance-requests` output, keeping open and fulfilled bids.
pub fn decode_spot_requests(raw: Value) -> Result<Vec<SpotRequest>, DecodeError> {
    let output: DescribeSpotRequestsOutput = shape(Category::SpotRequests, raw)?;
    Ok(output
        .spot_instance_requests
        .into_iter()
        .filter(|r| LIVE_SPOT_STATES.contains(&r.state.as_str()))
        .map(|r| {
            let status_message = r.status.and_then(|s| s.message.or(s.code));
            SpotRequest {
                id: r.spot_instance_request_id,
                instance_type: r
                    .launch_specification
                    .and_then(|l| l.instance_type)
                    .unwrap_or_else(|| "unknown".to_string()),
                price: r.spot_price,
                state: r.state,
                status_message,
                instance_id: r.instance_id,
            }
        })
        .collect())
}

pub fn decode_images(raw: Value) -> Result<Vec<Image>, DecodeError> {
    let output: DescribeImagesOutput = shape(Category::Images, raw)?;
    Ok(output
        .images
        .into_iter()
        .map(|i| Image {
            id: i.image_id,
            name: i.name,
            creation_date: i.creation_date,
            description: i.description,
            state: i.state,
        })
        .collect())
}

pub fn decode_key_pairs(raw: Value) -> Result<Vec<KeyPair>, DecodeError> {
    let output: DescribeKeyPairsOutput = shape(Category::KeyPairs, raw)?;
    Ok(output
        .key_pairs
        .into_iter()
        .map(|k| KeyPair { name: k.key_name })
        .collect())
}

pub fn decode_security_groups(raw: Value) -> Result<Vec<SecurityGroup>, DecodeError> {
    let output: DescribeSecurityGroupsOutput = shape(Category::SecurityGroups, raw)?;
    Ok(output
        .security_groups
        .into_iter()
        .map(|g| SecurityGroup {
            id: g.group_id,
            name: g.group_name,
        })
        .collect())
}

/// Decode `describe-spot-price-history` output. Prices arrive as strings.
pub fn decode_price_history(raw: Value) -> Result<Vec<PriceSample>, DecodeError> {
    let output: DescribePriceHistoryOutput = shape(Category::SpotPrices, raw)?;
    output
        .spot_price_history
        .into_iter()
        .map(|p| {
            let price = p
                .spot_price
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| DecodeError::Price {
                    instance_type: p.instance_type.clone(),
                    value: p.spot_price.clone(),
                })?;
            Ok(PriceSample {
                instance_type: p.instance_type,
                zone: p.availability_zone,
                price,
                timestamp: p.timestamp,
            })
        })
        .collect()
}

/// The newest image that can be launched from.
///
/// Images still being created (state other than `available`) are skipped.
pub fn latest_image(images: &[Image]) -> Option<&Image> {
    images
        .iter()
        .filter(|i| i.state.as_deref().map_or(true, |s| s == "available"))
        .max_by(|a, b| a.creation_date.cmp(&b.creation_date).then(a.id.cmp(&b.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_instances_keeps_running_only() {
        let raw = json!({
            "Reservations": [{
                "Instances": [
                    {
                        "InstanceId": "i-1",
                        "InstanceType": "t1.micro",
                        "PublicIpAddress": "1.2.3.4",
                        "State": {"Code": 16, "Name": "running"},
                        "LaunchTime": "2024-03-01T10:00:00+00:00"
                    },
                    {
                        "InstanceId": "i-2",
                        "InstanceType": "m1.xlarge",
                        "State": {"Code": 48, "Name": "terminated"},
                        "LaunchTime": "2024-03-01T09:00:00.000Z"
                    }
                ]
            }]
        });
        let instances = decode_instances(raw).unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].id, "i-1");
        assert_eq!(instances[0].public_address.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_decode_instances_rejects_wrong_shape() {
        let err = decode_instances(json!({"Instances": []})).unwrap_err();
        assert!(matches!(err, DecodeError::Shape { category: Category::Instances, .. }));
    }

    #[test]
    fn test_decode_spot_requests_filters_states() {
        let raw = json!({
            "SpotInstanceRequests": [
                {
                    "SpotInstanceRequestId": "sir-1",
                    "SpotPrice": "0.0400",
                    "State": "open",
                    "Status": {"Code": "pending-evaluation", "Message": "Your Spot request has been submitted"},
                    "LaunchSpecification": {"InstanceType": "m1.xlarge"}
                },
                {
                    "SpotInstanceRequestId": "sir-2",
                    "SpotPrice": "0.0400",
                    "State": "cancelled",
                    "LaunchSpecification": {"InstanceType": "m1.xlarge"}
                },
                {
                    "SpotInstanceRequestId": "sir-3",
                    "SpotPrice": "0.0100",
                    "State": "fulfilled",
                    "Status": {"Code": "fulfilled"},
                    "InstanceId": "i-9",
                    "LaunchSpecification": {"InstanceType": "t1.micro"}
                }
            ]
        });
        let requests = decode_spot_requests(raw).unwrap();
        let ids: Vec<&str> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["sir-1", "sir-3"]);
        assert_eq!(
            requests[0].status_message.as_deref(),
            Some("Your Spot request has been submitted")
        );
        assert_eq!(requests[1].status_message.as_deref(), Some("fulfilled"));
        assert_eq!(requests[1].instance_id.as_deref(), Some("i-9"));
    }

    #[test]
    fn test_decode_price_history_parses_strings() {
        let raw = json!({
            "SpotPriceHistory": [
                {"InstanceType": "m1.xlarge", "AvailabilityZone": "us-east-1b", "SpotPrice": "0.033200", "ProductDescription": "Linux/UNIX"}
            ]
        });
        let samples = decode_price_history(raw).unwrap();
        assert_eq!(samples.len(), 1);
        assert!((samples[0].price - 0.0332).abs() < 1e-12);
    }

    #[test]
    fn test_decode_price_history_rejects_bad_price() {
        let raw = json!({
            "SpotPriceHistory": [
                {"InstanceType": "m1.xlarge", "AvailabilityZone": "us-east-1b", "SpotPrice": "cheap"}
            ]
        });
        assert!(matches!(
            decode_price_history(raw),
            Err(DecodeError::Price { .. })
        ));
    }

    #[test]
    fn test_latest_image_skips_pending() {
        let raw = json!({
            "Images": [
                {"ImageId": "ami-old", "CreationDate": "2024-01-01T00:00:00.000Z", "State": "available"},
                {"ImageId": "ami-new", "CreationDate": "2024-02-01T00:00:00.000Z", "State": "available", "Description": "nightly"},
                {"ImageId": "ami-wip", "CreationDate": "2024-03-01T00:00:00.000Z", "State": "pending"}
            ]
        });
        let images = decode_images(raw).unwrap();
        let latest = latest_image(&images).unwrap();
        assert_eq!(latest.id, "ami-new");
        assert_eq!(latest.description.as_deref(), Some("nightly"));
    }

    #[test]
    fn test_latest_image_empty() {
        assert!(latest_image(&[]).is_none());
    }

    #[test]
    fn test_decode_key_pairs_and_groups() {
        let keys = decode_key_pairs(json!({"KeyPairs": [{"KeyName": "ops"}]})).unwrap();
        assert_eq!(keys, vec![KeyPair { name: "ops".to_string() }]);

        let groups = decode_security_groups(json!({
            "SecurityGroups": [{"GroupId": "sg-1", "GroupName": "ssh-only"}]
        }))
        .unwrap();
        assert_eq!(groups[0].id, "sg-1");
        assert_eq!(groups[0].name, "ssh-only");
    }
}
