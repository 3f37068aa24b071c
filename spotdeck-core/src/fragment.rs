//! Render fragments produced by a refresh pass.
//!
//! Fragments are presentation-neutral: a table of text cells with per-row
//! action links, or a notice. Shells decide how to draw them.

use crate::action::ActionRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, text)
    }
}

/// An action offered on a row, carrying its encoded command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    pub label: String,
    pub command: String,
}

impl ActionLink {
    pub fn new(label: impl Into<String>, action: &ActionRequest) -> Self {
        Self {
            label: label.into(),
            command: action.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<String>,
    pub actions: Vec<ActionLink>,
}

impl Row {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, link: ActionLink) -> Self {
        self.actions.push(link);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new<I, S>(title: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    Table(Table),
    Notice(Notice),
}

impl Fragment {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Fragment::Table(table) => Some(table),
            Fragment::Notice(_) => None,
        }
    }

    pub fn as_notice(&self) -> Option<&Notice> {
        match self {
            Fragment::Notice(notice) => Some(notice),
            Fragment::Table(_) => None,
        }
    }
}

impl From<Table> for Fragment {
    fn from(table: Table) -> Self {
        Fragment::Table(table)
    }
}

impl From<Notice> for Fragment {
    fn from(notice: Notice) -> Self {
        Fragment::Notice(notice)
    }
}

/// The output of one refresh pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedView {
    /// Monotonic pass number; a view only ever replaces an older one.
    pub sequence: u64,
    pub built_at: DateTime<Utc>,
    pub fragments: Vec<Fragment>,
}

impl RenderedView {
    pub fn new(sequence: u64, fragments: Vec<Fragment>) -> Self {
        Self {
            sequence,
            built_at: Utc::now(),
            fragments,
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.fragments.iter().filter_map(Fragment::as_table)
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.fragments.iter().filter_map(Fragment::as_notice)
    }

    /// Every action link in display order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionLink> {
        self.tables()
            .flat_map(|t| t.rows.iter())
            .flat_map(|r| r.actions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_link_encodes_command() {
        let action = ActionRequest::Terminate {
            instance_id: "i-1".to_string(),
            instance_type: "t1.micro".to_string(),
            address: "1.2.3.4".to_string(),
        };
        let link = ActionLink::new("terminate", &action);
        assert_eq!(link.command, "terminate i-1 t1.micro 1.2.3.4");
    }

    #[test]
    fn test_view_accessors() {
        let mut table = Table::new("Instances", ["id", "state"]);
        table.push(Row::new(["i-1", "running"]).with_action(ActionLink {
            label: "terminate".to_string(),
            command: "terminate i-1 t1.micro -".to_string(),
        }));
        let view = RenderedView::new(
            3,
            vec![Notice::info("hello").into(), table.into()],
        );
        assert_eq!(view.tables().count(), 1);
        assert_eq!(view.notices().count(), 1);
        assert_eq!(view.actions().count(), 1);
        assert_eq!(view.sequence, 3);
    }
}
