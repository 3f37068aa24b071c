//! Gateway backed by the `aws` command line client.
//!
//! Each call runs `aws ec2 <operation> --cli-input-json <args> --output json`
//! for the configured region (and profile, when set). Credentials are
//! whatever the CLI resolves on its own.

use crate::gateway::{Gateway, GatewayCall};
use async_trait::async_trait;
use serde_json::Value;
use spotdeck_core::{GatewayError, PanelConfig};
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_PROGRAM: &str = "aws";

/// Longest stderr excerpt carried in an error.
const MAX_MESSAGE_LEN: usize = 400;

#[derive(Debug, Clone)]
pub struct AwsCliGateway {
    program: String,
    region: String,
    profile: Option<String>,
    timeout: Duration,
}

impl AwsCliGateway {
    pub fn new(region: impl Into<String>, profile: Option<String>, timeout: Duration) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            region: region.into(),
            profile,
            timeout,
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(
            config.region.clone(),
            config.profile.clone(),
            config.request_timeout(),
        )
    }

    /// Run a different executable in place of `aws`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command_args(&self, call: &GatewayCall) -> Vec<String> {
        let mut args = vec![
            "ec2".to_string(),
            call.operation.name().to_string(),
            "--cli-input-json".to_string(),
            call.input_json().to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--region".to_string(),
            self.region.clone(),
        ];
        if let Some(profile) = &self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        args
    }
}

fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_MESSAGE_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[async_trait]
impl Gateway for AwsCliGateway {
    async fn invoke(&self, call: GatewayCall) -> Result<Value, GatewayError> {
        let operation = call.operation.name().to_string();
        let mut command = Command::new(&self.program);
        command.args(self.command_args(&call)).kill_on_drop(true);

        tracing::debug!(operation = %operation, region = %self.region, "invoking provider CLI");

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(GatewayError::Launch {
                    operation,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(GatewayError::Timeout {
                    operation,
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        if !output.status.success() {
            return Err(GatewayError::CommandFailed {
                operation,
                status: output.status.code().unwrap_or(-1),
                message: excerpt(&output.stderr),
            });
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| GatewayError::MalformedOutput {
            operation,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Operation;
    use serde_json::json;

    fn gateway() -> AwsCliGateway {
        AwsCliGateway::new("eu-west-1", Some("ops".to_string()), Duration::from_secs(5))
    }

    #[test]
    fn test_command_args() {
        let call = GatewayCall::new(Operation::TerminateInstances).arg("InstanceIds", json!(["i-1"]));
        let args = gateway().command_args(&call);
        assert_eq!(
            args,
            vec![
                "ec2",
                "terminate-instances",
                "--cli-input-json",
                r#"{"InstanceIds":["i-1"]}"#,
                "--output",
                "json",
                "--region",
                "eu-west-1",
                "--profile",
                "ops",
            ]
        );
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(1_000);
        let cut = excerpt(long.as_bytes());
        assert!(cut.ends_with("..."));
        assert_eq!(cut.len(), MAX_MESSAGE_LEN + 3);
        assert_eq!(excerpt(b"  denied \n"), "denied");
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let gateway = gateway().with_program("/nonexistent/spotdeck-aws");
        let err = gateway
            .invoke(GatewayCall::new(Operation::DescribeKeyPairs))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_command_failure() {
        let gateway = gateway().with_program("false");
        let err = gateway
            .invoke(GatewayCall::new(Operation::DescribeKeyPairs))
            .await
            .unwrap_err();
        match err {
            GatewayError::CommandFailed { operation, status, .. } => {
                assert_eq!(operation, "describe-key-pairs");
                assert_ne!(status, 0);
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_output_is_empty_object() {
        let gateway = gateway().with_program("true");
        let value = gateway
            .invoke(GatewayCall::new(Operation::CreateImage))
            .await
            .unwrap();
        assert_eq!(value, json!({}));
    }
}
