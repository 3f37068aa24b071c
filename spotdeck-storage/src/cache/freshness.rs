//! Staleness metadata carried by cache reads.
//!
//! A read never hands out a bare value: callers see when it was fetched and
//! whether the latest attempt to refresh it failed, so a stale value can be
//! shown as stale rather than silently passed off as current.

use super::entry::{EntryState, Outcome};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Borrowed view of a cached value and its freshness.
#[derive(Debug, Clone, Copy)]
pub struct CacheRead<'a, V> {
    value: &'a V,
    fetched_at: DateTime<Utc>,
    outcome: Outcome,
    last_error: Option<&'a str>,
}

impl<'a, V> CacheRead<'a, V> {
    pub(crate) fn new(value: &'a V, state: &'a EntryState) -> Option<Self> {
        let fetched_at = state.fetched_at()?;
        Some(Self {
            value,
            fetched_at,
            outcome: state.last_outcome().unwrap_or(Outcome::Fetched),
            last_error: state.last_error(),
        })
    }

    pub fn value(&self) -> &'a V {
        self.value
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// True when the most recent refresh attempt failed and this value is
    /// left over from an earlier pass.
    pub fn is_stale(&self) -> bool {
        self.outcome == Outcome::Failed
    }

    pub fn was_cache_hit(&self) -> bool {
        self.outcome == Outcome::Hit
    }

    /// Error text of the failed refresh, when stale.
    pub fn error(&self) -> Option<&'a str> {
        self.last_error
    }

    pub fn staleness_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn map<U, F>(self, f: F) -> CacheRead<'a, U>
    where
        F: FnOnce(&'a V) -> &'a U,
    {
        CacheRead {
            value: f(self.value),
            fetched_at: self.fetched_at,
            outcome: self.outcome,
            last_error: self.last_error,
        }
    }
}

/// Compact human form of an age, e.g. `42s`, `5m`, `2h`.
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3_600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h", secs / 3_600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotdeck_core::CachePolicy;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_no_read_before_first_fetch() {
        let state = EntryState::new(CachePolicy::new(60, 3));
        assert!(CacheRead::new(&1u8, &state).is_none());
    }

    #[test]
    fn test_read_after_fetch() {
        let mut state = EntryState::new(CachePolicy::new(60, 3));
        state.mark_fetched(t0());
        let read = CacheRead::new(&5u8, &state).unwrap();

        assert!(!read.is_stale());
        assert!(!read.was_cache_hit());
        assert_eq!(*read.value(), 5);
        assert_eq!(
            read.staleness_at(t0() + chrono::Duration::seconds(42)),
            Duration::from_secs(42)
        );
    }

    #[test]
    fn test_read_after_failure_is_stale() {
        let mut state = EntryState::new(CachePolicy::new(60, 3));
        state.mark_fetched(t0());
        state.mark_failed("throttled".to_string());
        let read = CacheRead::new(&5u8, &state).unwrap();

        assert!(read.is_stale());
        assert_eq!(read.error(), Some("throttled"));
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_secs(0)), "0s");
        assert_eq!(format_age(Duration::from_secs(59)), "59s");
        assert_eq!(format_age(Duration::from_secs(300)), "5m");
        assert_eq!(format_age(Duration::from_secs(7_300)), "2h");
    }
}
