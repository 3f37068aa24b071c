//! View rendering dispatch.

pub mod fragments;
pub mod selection;
pub mod stats;

use crate::state::App;
use crate::theme::notification_color;
use crate::widgets::{ConfirmModal, StatusIndicator};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(layout[1]);
    fragments::render(f, app, body[0]);
    render_side_panel(f, app, body[1]);

    render_footer(f, app, layout[2]);

    if let Some(pending) = &app.modal {
        let modal = ConfirmModal {
            title: "Confirm",
            prompt: pending.prompt(),
            theme: &app.theme,
        };
        modal.render(f, f.size());
    }
}

fn render_side_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let action_height = app
        .selected_row()
        .map(|r| r.actions.len().max(1) as u16 + 2)
        .unwrap_or(3);

    let mut constraints = Vec::new();
    if app.show_stats {
        constraints.push(Constraint::Length(stats::height(app)));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(action_height));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    if app.show_stats {
        stats::render(f, app, chunks[0]);
        next = 1;
    }
    selection::render_detail(f, app, chunks[next]);
    selection::render_actions(f, app, chunks[next + 1]);
}

fn header(app: &App) -> StatusIndicator<'static> {
    let mut segments = vec![(
        format!("Region: {}", app.region),
        Style::default().fg(app.theme.primary),
    )];
    segments.push(match &app.view {
        Some(view) => (
            format!("View #{} at {}", view.sequence, view.built_at.format("%H:%M:%S")),
            Style::default().fg(app.theme.text),
        ),
        None => ("no data yet".to_string(), Style::default().fg(app.theme.text_dim)),
    });
    segments.push(if app.busy {
        (
            "REFRESHING...".to_string(),
            Style::default()
                .fg(app.theme.warning)
                .add_modifier(Modifier::BOLD),
        )
    } else if app.paused {
        ("PAUSED".to_string(), Style::default().fg(app.theme.tertiary))
    } else {
        ("idle".to_string(), Style::default().fg(app.theme.text_dim))
    });

    let border = if app.busy {
        app.theme.warning
    } else {
        app.theme.border
    };
    StatusIndicator {
        title: "SPOTDECK",
        segments,
        border_style: Style::default().fg(border),
    }
}

/// Plain header text; busy treatment while a pass is pending or running.
pub fn header_status(app: &App) -> String {
    header(app).text()
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    header(app).render(f, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = if app.modal.is_some() {
        "Enter/y confirm • Esc/n decline"
    } else {
        "j/k rows • h/l actions • Enter run • r refresh • p pause • s stats • q quit"
    };
    let (text, style) = match app.notifications.last() {
        Some(note) => (
            format!("{}: {}", note.level.label(), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
