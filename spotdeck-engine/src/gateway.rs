//! Remote command gateway.
//!
//! The single seam between the engine and the provider. A call names an
//! operation and carries its arguments as a JSON object; the result is the
//! provider's structured reply, undecoded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spotdeck_core::GatewayError;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    DescribeInstances,
    DescribeSpotInstanceRequests,
    DescribeImages,
    DescribeKeyPairs,
    DescribeSecurityGroups,
    DescribeSpotPriceHistory,
    RequestSpotInstances,
    CancelSpotInstanceRequests,
    CreateImage,
    TerminateInstances,
}

impl Operation {
    /// Provider command name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::DescribeInstances => "describe-instances",
            Operation::DescribeSpotInstanceRequests => "describe-spot-instance-requests",
            Operation::DescribeImages => "describe-images",
            Operation::DescribeKeyPairs => "describe-key-pairs",
            Operation::DescribeSecurityGroups => "describe-security-groups",
            Operation::DescribeSpotPriceHistory => "describe-spot-price-history",
            Operation::RequestSpotInstances => "request-spot-instances",
            Operation::CancelSpotInstanceRequests => "cancel-spot-instance-requests",
            Operation::CreateImage => "create-image",
            Operation::TerminateInstances => "terminate-instances",
        }
    }

    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::RequestSpotInstances
                | Operation::CancelSpotInstanceRequests
                | Operation::CreateImage
                | Operation::TerminateInstances
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One remote invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayCall {
    pub operation: Operation,
    pub args: BTreeMap<String, Value>,
}

impl GatewayCall {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            args: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Arguments as the JSON document handed to the provider.
    pub fn input_json(&self) -> Value {
        Value::Object(self.args.clone().into_iter().collect())
    }
}

/// Invokes remote operations.
///
/// Implementations must be `Send + Sync`; the engine holds one behind an
/// `Arc` and moves it between tasks.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn invoke(&self, call: GatewayCall) -> Result<Value, GatewayError>;
}
