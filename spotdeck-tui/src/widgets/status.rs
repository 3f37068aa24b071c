//! Header status line.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Segments drawn left to right, separated by a bar.
pub struct StatusIndicator<'a> {
    pub title: &'a str,
    pub segments: Vec<(String, Style)>,
    pub border_style: Style,
}

impl<'a> StatusIndicator<'a> {
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|(text, _)| text.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans = Vec::new();
        for (i, (text, style)) in self.segments.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" | "));
            }
            spans.push(Span::styled(text.clone(), *style));
        }
        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(self.title)
                .borders(Borders::ALL)
                .border_style(self.border_style),
        );
        f.render_widget(paragraph, area);
    }
}
