//! Reusable widget components.

pub mod actions;
pub mod detail;
pub mod modal;
pub mod status;

pub use actions::ActionPanel;
pub use detail::DetailPanel;
pub use modal::{centered_rect, ConfirmModal};
pub use status::StatusIndicator;
