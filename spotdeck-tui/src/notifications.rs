//! Notification system for the TUI.

use chrono::{DateTime, Utc};
use spotdeck_core::NoticeLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "OK",
        }
    }
}

impl From<NoticeLevel> for NotificationLevel {
    fn from(level: NoticeLevel) -> Self {
        match level {
            NoticeLevel::Info => NotificationLevel::Info,
            NoticeLevel::Success => NotificationLevel::Success,
            NoticeLevel::Warning => NotificationLevel::Warning,
            NoticeLevel::Error => NotificationLevel::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
