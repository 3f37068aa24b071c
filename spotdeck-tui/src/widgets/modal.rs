//! Confirmation modal.

use crate::theme::DeckTheme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct ConfirmModal<'a> {
    pub title: &'a str,
    pub prompt: String,
    pub theme: &'a DeckTheme,
}

impl<'a> ConfirmModal<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let popup = centered_rect(60, 7, area);
        let lines = vec![
            Line::from(Span::styled(
                self.prompt.clone(),
                Style::default().fg(self.theme.text),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "Enter/y",
                    Style::default()
                        .fg(self.theme.success)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" confirm   "),
                Span::styled(
                    "Esc/n",
                    Style::default()
                        .fg(self.theme.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" decline"),
            ]),
        ];

        let widget = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(self.theme.bg))
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border_focus)),
            );

        f.render_widget(Clear, popup);
        f.render_widget(widget, popup);
    }
}

/// A rectangle `percent_x` wide and `height` rows tall centered in `area`.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x.min(100)) / 2),
            Constraint::Percentage(percent_x.min(100)),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 7, area);
        assert_eq!(popup.height, 7);
        assert_eq!(popup.width, 60);
        assert!(popup.x >= 20 && popup.y >= 16);
    }

    #[test]
    fn test_centered_rect_clamps_height() {
        let area = Rect::new(0, 0, 80, 4);
        assert!(centered_rect(60, 7, area).height <= 4);
    }
}
