//! Field/value panel for the selected row.

use crate::theme::{resource_state_color, DeckTheme};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use spotdeck_core::action::ABSENT;

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, &'a str)>,
    pub theme: &'a DeckTheme,
}

impl<'a> DetailPanel<'a> {
    fn value_style(&self, label: &str, value: &str) -> Style {
        if value == ABSENT {
            Style::default().fg(self.theme.text_dim)
        } else if label == "State" {
            Style::default().fg(resource_state_color(value, self.theme))
        } else {
            Style::default().fg(self.theme.text)
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let label_width = self.fields.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let lines: Vec<Line> = self
            .fields
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>width$} ", label, width = label_width),
                        Style::default().fg(self.theme.secondary),
                    ),
                    Span::styled(value.to_string(), self.value_style(label, value)),
                ])
            })
            .collect();

        let widget = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}
