//! Selected row detail and its actions.

use crate::state::App;
use crate::widgets::{ActionPanel, DetailPanel};
use ratatui::{layout::Rect, Frame};

pub fn render_detail(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut fields = Vec::new();
    let table = app
        .selected_cursor()
        .and_then(|(t, _)| app.view.as_ref()?.tables().nth(t));
    if let (Some(table), Some(row)) = (table, app.selected_row()) {
        for (header, cell) in table.headers.iter().zip(row.cells.iter()) {
            fields.push((header.as_str(), cell.as_str()));
        }
    }

    let detail = DetailPanel {
        title: "Selected",
        fields,
        theme: &app.theme,
    };
    detail.render(f, area);
}

pub fn render_actions(f: &mut Frame<'_>, app: &App, area: Rect) {
    let actions = app
        .selected_row()
        .map(|r| r.actions.as_slice())
        .unwrap_or(&[]);
    let selected = if actions.is_empty() {
        None
    } else {
        Some(app.action_index)
    };
    ActionPanel::new("Actions [h/l, Enter]", actions, &app.theme)
        .with_selected(selected)
        .render(f, area);
}
