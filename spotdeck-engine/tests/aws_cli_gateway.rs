//! The CLI gateway against stand-in executables.
#![cfg(unix)]

use spotdeck_core::resources::decode_key_pairs;
use spotdeck_core::GatewayError;
use spotdeck_engine::{AwsCliGateway, Gateway, GatewayCall, Operation};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("aws");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn gateway(program: &PathBuf, timeout: Duration) -> AwsCliGateway {
    AwsCliGateway::new("eu-west-1", None, timeout).with_program(program.to_string_lossy())
}

#[tokio::test]
async fn test_output_is_parsed_as_json() {
    let dir = TempDir::new().unwrap();
    let args_file = dir.path().join("args");
    let program = script(
        &dir,
        &format!(
            "echo \"$@\" > {}\necho '{{\"KeyPairs\": [{{\"KeyName\": \"deploy\"}}]}}'",
            args_file.display()
        ),
    );

    let raw = gateway(&program, Duration::from_secs(5))
        .invoke(GatewayCall::new(Operation::DescribeKeyPairs))
        .await
        .unwrap();

    let pairs = decode_key_pairs(raw).unwrap();
    assert_eq!(pairs[0].name, "deploy");

    let args = std::fs::read_to_string(args_file).unwrap();
    assert!(args.starts_with("ec2 describe-key-pairs --cli-input-json {}"));
    assert!(args.contains("--output json --region eu-west-1"));
}

#[tokio::test]
async fn test_stderr_is_carried_in_failure() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "echo 'An error occurred (AuthFailure)' >&2\nexit 254");

    let err = gateway(&program, Duration::from_secs(5))
        .invoke(GatewayCall::new(Operation::DescribeImages))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::CommandFailed {
            operation: "describe-images".to_string(),
            status: 254,
            message: "An error occurred (AuthFailure)".to_string(),
        }
    );
}

#[tokio::test]
async fn test_garbage_output_is_malformed() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "echo 'not json'");

    let err = gateway(&program, Duration::from_secs(5))
        .invoke(GatewayCall::new(Operation::DescribeImages))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::MalformedOutput { .. }));
}

#[tokio::test]
async fn test_slow_command_times_out() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "sleep 5");

    let err = gateway(&program, Duration::from_millis(100))
        .invoke(GatewayCall::new(Operation::DescribeInstances))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::Timeout {
            operation: "describe-instances".to_string(),
            timeout_ms: 100,
        }
    );
}
