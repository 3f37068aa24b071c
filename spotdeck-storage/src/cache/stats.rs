//! Per-category cache counters for display and logging.

use super::entry::EntryState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use spotdeck_core::Category;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryStats {
    pub category: Category,
    pub hits: u64,
    pub fetches: u64,
    pub failures: u64,
    pub grace_budget: u32,
    pub age: Option<Duration>,
    pub last_error: Option<String>,
}

impl EntryStats {
    pub fn from_state(category: Category, state: &EntryState, now: DateTime<Utc>) -> Self {
        Self {
            category,
            hits: state.hits(),
            fetches: state.fetches(),
            failures: state.failures(),
            grace_budget: state.grace_budget(),
            age: state.age_at(now),
            last_error: state.last_error().map(str::to_string),
        }
    }

    /// Share of decisions served from cache (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.fetches + self.failures;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: Vec<EntryStats>,
}

impl CacheStats {
    pub fn entry(&self, category: Category) -> Option<&EntryStats> {
        self.entries.iter().find(|e| e.category == category)
    }

    pub fn total_hits(&self) -> u64 {
        self.entries.iter().map(|e| e.hits).sum()
    }

    pub fn total_fetches(&self) -> u64 {
        self.entries.iter().map(|e| e.fetches).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.entries.iter().map(|e| e.failures).sum()
    }
}
