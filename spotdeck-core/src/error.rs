//! Error types for SPOTDECK operations

use crate::Category;
use thiserror::Error;

/// Remote command gateway errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{operation} failed with status {status}: {message}")]
    CommandFailed {
        operation: String,
        status: i32,
        message: String,
    },

    #[error("Failed to launch {operation}: {reason}")]
    Launch { operation: String, reason: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("{operation} returned malformed output: {reason}")]
    MalformedOutput { operation: String, reason: String },
}

/// A successful call returned a shape the engine cannot read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected {category} payload: {reason}")]
    Shape { category: Category, reason: String },

    #[error("Unexpected {operation} result: {reason}")]
    ActionResult { operation: String, reason: String },

    #[error("Invalid price {value:?} for {instance_type}")]
    Price { instance_type: String, value: String },
}

/// An operator-configured selection pattern did not match exactly one candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{what} pattern {pattern:?} matched nothing (candidates: {}); adjust the pattern", format_candidates(.candidates))]
    NoMatch {
        what: &'static str,
        pattern: String,
        candidates: Vec<String>,
    },

    #[error("{what} pattern {pattern:?} is ambiguous, it matched {}; narrow the pattern", format_candidates(.matches))]
    Ambiguous {
        what: &'static str,
        pattern: String,
        matches: Vec<String>,
    },

    #[error("No machine image available to start from")]
    NoImage,
}

/// Malformed encoded action command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("Empty action command")]
    Empty,

    #[error("Unknown action command: {0}")]
    UnknownCommand(String),

    #[error("{command} expects {expected} arguments, got {got}")]
    Arity {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid {field} for {command}: {value:?}")]
    InvalidArgument {
        command: &'static str,
        field: &'static str,
        value: String,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all SPOTDECK errors.
#[derive(Debug, Error)]
pub enum SpotdeckError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Action error: {0}")]
    Action(#[from] ActionParseError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for SPOTDECK operations.
pub type SpotdeckResult<T> = Result<T, SpotdeckError>;

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "none".to_string()
    } else {
        candidates.join(", ")
    }
}
