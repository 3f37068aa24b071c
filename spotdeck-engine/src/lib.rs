//! SPOTDECK Engine - Refresh, Cache and Dispatch
//!
//! Decides per category whether to query the provider or serve the cached
//! value, serializes operator actions into the refresh cycle, and rebuilds
//! the rendered view after every pass.

pub mod aws_cli;
pub mod context;
pub mod dispatcher;
pub mod gateway;
pub mod offers;
pub mod orchestrator;
pub mod pass;
pub mod scheduler;

pub use aws_cli::AwsCliGateway;
pub use context::Engine;
pub use dispatcher::{dispatch, execute, parse_action, ActionOutcome, PendingAction};
pub use gateway::{Gateway, GatewayCall, Operation};
pub use orchestrator::fetch_call;
pub use pass::RefreshPass;
pub use scheduler::{Scheduler, SchedulerError, SchedulerState, Step};
