//! Error types for the TUI.

use spotdeck_core::ConfigError;
use spotdeck_engine::SchedulerError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("Refresh pass task failed: {0}")]
    Pass(#[from] tokio::task::JoinError),
    #[error("Failed to initialise logging: {0}")]
    Log(String),
}
