//! Panel theme and color utilities.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;
use spotdeck_core::NoticeLevel;

#[derive(Debug, Clone)]
pub struct DeckTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl DeckTheme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            tertiary: Color::Rgb(255, 255, 0),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

impl Default for DeckTheme {
    fn default() -> Self {
        Self::dark()
    }
}

pub fn notice_color(level: NoticeLevel, theme: &DeckTheme) -> Color {
    notification_color(level.into(), theme)
}

pub fn notification_color(level: NotificationLevel, theme: &DeckTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Color for an instance or spot request state cell.
pub fn resource_state_color(state: &str, theme: &DeckTheme) -> Color {
    match state.trim().to_ascii_lowercase().as_str() {
        "running" | "active" | "fulfilled" => theme.success,
        "pending" | "open" | "stopping" => theme.warning,
        "shutting-down" | "terminated" | "cancelled" | "failed" | "closed" => theme.error,
        _ => theme.text,
    }
}

/// Color for an action label; destructive commands stand out.
pub fn action_color(command: &str, theme: &DeckTheme) -> Color {
    match command.split_whitespace().next() {
        Some(spotdeck_core::action::TERMINATE) | Some(spotdeck_core::action::CANCEL_BID) => {
            theme.error
        }
        Some(spotdeck_core::action::START) => theme.success,
        Some(spotdeck_core::action::SNAPSHOT) => theme.tertiary,
        _ => theme.text_dim,
    }
}

pub fn hit_rate_color(rate: f64, theme: &DeckTheme) -> Color {
    if rate >= 0.7 {
        theme.success
    } else if rate >= 0.3 {
        theme.warning
    } else {
        theme.error
    }
}
