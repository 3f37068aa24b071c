//! The rendered view body: tables and notices in pass order.

use crate::state::App;
use crate::theme::{notice_color, resource_state_color};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use spotdeck_core::{Fragment, Notice};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(view) = &app.view else {
        let waiting = Paragraph::new("Waiting for the first refresh...")
            .style(Style::default().fg(app.theme.text_dim))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(waiting, area);
        return;
    };

    let mut constraints: Vec<Constraint> = view
        .fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Notice(_) => Constraint::Length(1),
            Fragment::Table(table) => Constraint::Length(table.rows.len().max(1) as u16 + 3),
        })
        .collect();
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let selected = app.selected_cursor();
    let mut table_index = 0;
    for (fragment, chunk) in view.fragments.iter().zip(chunks.iter()) {
        match fragment {
            Fragment::Notice(notice) => render_notice(f, app, notice, *chunk),
            Fragment::Table(table) => {
                let row = selected.and_then(|(t, r)| (t == table_index).then_some(r));
                render_table(f, app, table, row, *chunk);
                table_index += 1;
            }
        }
    }
}

fn render_notice(f: &mut Frame<'_>, app: &App, notice: &Notice, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!("{:?}: ", notice.level),
            Style::default()
                .fg(notice_color(notice.level, &app.theme))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(notice.text.clone()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_table(
    f: &mut Frame<'_>,
    app: &App,
    table: &spotdeck_core::Table,
    selected: Option<usize>,
    area: Rect,
) {
    let state_column = table.headers.iter().position(|h| h == "State");

    let widths: Vec<Constraint> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let widest = table
                .rows
                .iter()
                .filter_map(|r| r.cells.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            Constraint::Length(widest as u16 + 1)
        })
        .collect();

    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|row| {
            let cells = row.cells.iter().enumerate().map(|(i, cell)| {
                let style = if Some(i) == state_column {
                    Style::default().fg(resource_state_color(cell, &app.theme))
                } else {
                    Style::default().fg(app.theme.text)
                };
                Cell::from(cell.clone()).style(style)
            });
            Row::new(cells)
        })
        .collect();

    let header = Row::new(table.headers.iter().map(|h| Cell::from(h.clone())))
        .style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );

    let widget = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(table.title.as_str())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if selected.is_some() {
                    app.theme.border_focus
                } else {
                    app.theme.border
                })),
        )
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(selected);
    f.render_stateful_widget(widget, area, &mut state);
}
