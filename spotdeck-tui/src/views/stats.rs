//! Cache statistics panel.

use crate::state::App;
use crate::theme::hit_rate_color;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};
use spotdeck_storage::format_age;

pub fn height(app: &App) -> u16 {
    app.stats.entries.len() as u16 + 3
}

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let header = Row::new(["Category", "Hit", "Fetch", "Fail", "Age"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .stats
        .entries
        .iter()
        .map(|entry| {
            let age = entry.age.map(format_age).unwrap_or_else(|| "-".to_string());
            let failures = Cell::from(entry.failures.to_string()).style(if entry.last_error.is_some() {
                Style::default().fg(app.theme.error)
            } else {
                Style::default()
            });
            Row::new(vec![
                Cell::from(entry.category.key()),
                Cell::from(entry.hits.to_string())
                    .style(Style::default().fg(hit_rate_color(entry.hit_rate(), &app.theme))),
                Cell::from(entry.fetches.to_string()),
                failures,
                Cell::from(age),
            ])
        })
        .collect();

    let title = format!(
        "Cache [{} hit / {} fetch / {} fail]",
        app.stats.total_hits(),
        app.stats.total_fetches(),
        app.stats.total_failures()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(4),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.primary_dim)),
    );
    f.render_widget(table, area);
}
