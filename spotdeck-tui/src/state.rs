//! Application state.

use crate::keys::Action;
use crate::notifications::{Notification, NotificationLevel};
use crate::theme::DeckTheme;
use spotdeck_core::{ActionLink, PanelConfig, RenderedView, Row};
use spotdeck_engine::{PendingAction, RefreshPass};
use spotdeck_storage::CacheStats;

const MAX_NOTIFICATIONS: usize = 50;

/// Position of a row inside the displayed view: (table index, row index).
pub type RowCursor = (usize, usize);

/// What the event loop must do in response to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    Request(RefreshPass),
    SetPaused(bool),
}

#[derive(Debug, Clone)]
pub struct App {
    pub theme: DeckTheme,
    pub region: String,
    pub view: Option<RenderedView>,
    /// Rows that carry at least one action, in display order.
    actionable: Vec<RowCursor>,
    pub selected: Option<usize>,
    pub action_index: usize,
    pub modal: Option<PendingAction>,
    pub notifications: Vec<Notification>,
    pub busy: bool,
    pub paused: bool,
    pub show_stats: bool,
    pub stats: CacheStats,
}

impl App {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            theme: DeckTheme::default(),
            region: config.region.clone(),
            view: None,
            actionable: Vec::new(),
            selected: None,
            action_index: 0,
            modal: None,
            notifications: Vec::new(),
            busy: false,
            paused: false,
            show_stats: false,
            stats: CacheStats::default(),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.view.as_ref().map(|v| v.sequence).unwrap_or(0)
    }

    /// Replace the displayed view. A view not newer than the current one is
    /// dropped and `false` returned.
    pub fn show_view(&mut self, view: RenderedView) -> bool {
        if view.sequence <= self.sequence() {
            tracing::warn!(
                incoming = view.sequence,
                displayed = self.sequence(),
                "ignoring out-of-order view"
            );
            return false;
        }

        let previous_key = self.selected_row().and_then(|r| r.cells.first().cloned());

        self.actionable = view
            .tables()
            .enumerate()
            .flat_map(|(t, table)| {
                table
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| !row.actions.is_empty())
                    .map(move |(r, _)| (t, r))
            })
            .collect();
        self.view = Some(view);

        // Follow the previously selected resource if it is still listed.
        let followed = previous_key.and_then(|key| {
            self.actionable.iter().position(|&cursor| {
                self.row_at(cursor)
                    .and_then(|r| r.cells.first())
                    .is_some_and(|cell| *cell == key)
            })
        });
        self.selected = match (followed, self.selected) {
            (Some(index), _) => Some(index),
            _ if self.actionable.is_empty() => None,
            (None, Some(index)) => Some(index.min(self.actionable.len() - 1)),
            (None, None) => Some(0),
        };
        self.clamp_action_index();
        true
    }

    fn row_at(&self, (t, r): RowCursor) -> Option<&Row> {
        self.view.as_ref()?.tables().nth(t)?.rows.get(r)
    }

    pub fn selected_cursor(&self) -> Option<RowCursor> {
        self.selected.and_then(|i| self.actionable.get(i).copied())
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.selected_cursor().and_then(|cursor| self.row_at(cursor))
    }

    pub fn selected_action(&self) -> Option<&ActionLink> {
        self.selected_row()?.actions.get(self.action_index)
    }

    pub fn actionable_rows(&self) -> usize {
        self.actionable.len()
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    pub fn select_next(&mut self) {
        if self.actionable.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(index) => (index + 1) % self.actionable.len(),
            None => 0,
        });
        self.action_index = 0;
    }

    pub fn select_previous(&mut self) {
        if self.actionable.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.actionable.len() - 1,
            Some(index) => index - 1,
        });
        self.action_index = 0;
    }

    pub fn next_action(&mut self) {
        let count = self.selected_row().map(|r| r.actions.len()).unwrap_or(0);
        if count > 0 {
            self.action_index = (self.action_index + 1) % count;
        }
    }

    pub fn previous_action(&mut self) {
        let count = self.selected_row().map(|r| r.actions.len()).unwrap_or(0);
        if count > 0 {
            self.action_index = (self.action_index + count - 1) % count;
        }
    }

    fn clamp_action_index(&mut self) {
        let count = self.selected_row().map(|r| r.actions.len()).unwrap_or(0);
        if self.action_index >= count {
            self.action_index = 0;
        }
    }

    /// Put the selected row action to the operator.
    pub fn open_modal(&mut self) {
        let Some(command) = self.selected_action().map(|a| a.command.clone()) else {
            return;
        };
        match PendingAction::prepare(&command) {
            Ok(pending) => self.modal = Some(pending),
            Err(e) => self.notify(NotificationLevel::Error, format!("Cannot run {:?}: {}", command, e)),
        }
    }

    pub fn handle(&mut self, action: Action) -> Option<Effect> {
        if action == Action::Quit {
            return Some(Effect::Quit);
        }

        if let Some(pending) = self.modal.take() {
            match action {
                Action::Confirm => {
                    let name = pending.action().command_name();
                    self.notify(NotificationLevel::Info, format!("{} confirmed", name));
                    return Some(Effect::Request(pending.confirm()));
                }
                Action::Cancel => {
                    pending.decline();
                    self.notify(NotificationLevel::Info, "Action declined");
                }
                _ => self.modal = Some(pending),
            }
            return None;
        }

        match action {
            Action::MoveDown => self.select_next(),
            Action::MoveUp => self.select_previous(),
            Action::MoveRight => self.next_action(),
            Action::MoveLeft => self.previous_action(),
            Action::Confirm => self.open_modal(),
            Action::Cancel => self.notifications.clear(),
            Action::ToggleStats => self.show_stats = !self.show_stats,
            Action::Refresh => return Some(Effect::Request(RefreshPass::full())),
            Action::PauseUpdates => {
                self.paused = !self.paused;
                let message = if self.paused {
                    "Periodic refresh paused"
                } else {
                    "Periodic refresh resumed"
                };
                self.notify(NotificationLevel::Info, message);
                return Some(Effect::SetPaused(self.paused));
            }
            Action::Quit => return Some(Effect::Quit),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotdeck_core::{Notice, Table};

    fn view(sequence: u64, ids: &[&str]) -> RenderedView {
        let mut table = Table::new("Instances", ["Instance"]);
        for id in ids {
            table.push(
                Row::new([*id])
                    .with_action(ActionLink {
                        label: "snapshot".to_string(),
                        command: format!("snapshot {} t1.micro -", id),
                    })
                    .with_action(ActionLink {
                        label: "terminate".to_string(),
                        command: format!("terminate {} t1.micro -", id),
                    }),
            );
        }
        table.push(Row::new(["no actions"]));
        RenderedView::new(sequence, vec![Notice::info("hello").into(), table.into()])
    }

    fn app() -> App {
        App::new(&PanelConfig::default())
    }

    #[test]
    fn test_older_view_is_ignored() {
        let mut app = app();
        assert!(app.show_view(view(2, &["i-1"])));
        assert!(!app.show_view(view(1, &["i-9"])));
        assert!(!app.show_view(view(2, &["i-9"])));
        assert_eq!(app.selected_row().unwrap().cells[0], "i-1");
    }

    #[test]
    fn test_rows_without_actions_are_skipped() {
        let mut app = app();
        app.show_view(view(1, &["i-1", "i-2"]));
        assert_eq!(app.actionable_rows(), 2);
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_row().unwrap().cells[0], "i-1");
        app.select_previous();
        assert_eq!(app.selected_row().unwrap().cells[0], "i-2");
    }

    #[test]
    fn test_selection_follows_resource() {
        let mut app = app();
        app.show_view(view(1, &["i-1", "i-2"]));
        app.select_next();
        app.show_view(view(2, &["i-0", "i-1", "i-2"]));
        assert_eq!(app.selected_row().unwrap().cells[0], "i-2");
    }

    #[test]
    fn test_confirm_opens_modal_then_requests_pass() {
        let mut app = app();
        app.show_view(view(1, &["i-1"]));
        app.handle(Action::MoveRight);

        assert_eq!(app.handle(Action::Confirm), None);
        let prompt = app.modal.as_ref().unwrap().prompt();
        assert!(prompt.contains("i-1"));

        match app.handle(Action::Confirm) {
            Some(Effect::Request(pass)) => {
                assert_eq!(pass.preceding_action.unwrap().command_name(), "terminate");
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert!(app.modal.is_none());
    }

    #[test]
    fn test_decline_closes_modal_without_effect() {
        let mut app = app();
        app.show_view(view(1, &["i-1"]));
        app.handle(Action::Confirm);
        assert_eq!(app.handle(Action::Cancel), None);
        assert!(app.modal.is_none());
    }

    #[test]
    fn test_navigation_is_ignored_while_modal_open() {
        let mut app = app();
        app.show_view(view(1, &["i-1", "i-2"]));
        app.handle(Action::Confirm);
        app.handle(Action::MoveDown);
        assert!(app.modal.is_some());
        assert_eq!(app.selected, Some(0));
    }

    #[test]
    fn test_pause_toggles() {
        let mut app = app();
        assert_eq!(app.handle(Action::PauseUpdates), Some(Effect::SetPaused(true)));
        assert_eq!(app.handle(Action::PauseUpdates), Some(Effect::SetPaused(false)));
    }

    #[test]
    fn test_malformed_row_action_is_reported() {
        let mut app = app();
        let mut table = Table::new("Broken", ["x"]);
        table.push(Row::new(["x"]).with_action(ActionLink {
            label: "reboot".to_string(),
            command: "reboot i-1".to_string(),
        }));
        app.show_view(RenderedView::new(1, vec![table.into()]));

        app.handle(Action::Confirm);

        assert!(app.modal.is_none());
        assert_eq!(
            app.notifications.last().unwrap().level,
            NotificationLevel::Error
        );
    }
}
