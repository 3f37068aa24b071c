//! Row action panel.
//!
//! Lists the actions offered on the selected row with the one Enter would
//! run highlighted.

use crate::theme::{action_color, DeckTheme};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use spotdeck_core::ActionLink;

pub struct ActionPanel<'a> {
    pub title: &'a str,
    pub actions: &'a [ActionLink],
    pub selected: Option<usize>,
    pub theme: &'a DeckTheme,
}

impl<'a> ActionPanel<'a> {
    pub fn new(title: &'a str, actions: &'a [ActionLink], theme: &'a DeckTheme) -> Self {
        Self {
            title,
            actions,
            selected: None,
            theme,
        }
    }

    pub fn with_selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border));

        if self.actions.is_empty() {
            let empty = List::new(vec![ListItem::new("No actions available")])
                .block(block)
                .style(Style::default().fg(self.theme.text_dim));
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .actions
            .iter()
            .map(|action| {
                let color = action_color(&action.command, self.theme);
                ListItem::new(Line::from(vec![
                    Span::styled(format!("[{}] ", action.label), Style::default().fg(color)),
                    Span::styled(
                        action.command.clone(),
                        Style::default().fg(self.theme.text_dim),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(self.theme.bg_highlight)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = ListState::default();
        state.select(self.selected);
        f.render_stateful_widget(list, area, &mut state);
    }
}
