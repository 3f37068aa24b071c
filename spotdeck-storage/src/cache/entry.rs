//! One cached category: its value plus the bookkeeping that decides when
//! the value must be fetched again.

use chrono::{DateTime, Utc};
use spotdeck_core::CachePolicy;
use std::time::Duration;

/// How the value currently held was obtained on the most recent pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Served without a remote call.
    Hit,
    /// Fetched and decoded successfully.
    Fetched,
    /// The fetch failed; any value held is from an earlier pass.
    Failed,
}

/// Freshness bookkeeping for one category, independent of the value type.
#[derive(Debug, Clone)]
pub struct EntryState {
    policy: CachePolicy,
    fetched_at: Option<DateTime<Utc>>,
    grace_budget: u32,
    last_error: Option<String>,
    last_outcome: Option<Outcome>,
    hits: u64,
    fetches: u64,
    failures: u64,
}

impl EntryState {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            fetched_at: None,
            grace_budget: policy.grace_passes,
            last_error: None,
            last_outcome: None,
            hits: 0,
            fetches: 0,
            failures: 0,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn grace_budget(&self) -> u32 {
        self.grace_budget
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Age of the held value, if any was ever fetched.
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.fetched_at
            .map(|at| (now - at).to_std().unwrap_or(Duration::ZERO))
    }

    /// Decide whether this pass must query the remote side.
    ///
    /// Serving from cache spends one unit of grace budget; the pass that
    /// spends the last unit fetches instead. Expiry of the TTL always fetches.
    pub fn should_fetch_at(&mut self, now: DateTime<Utc>) -> bool {
        let Some(age) = self.age_at(now) else {
            return true;
        };
        if age >= self.policy.ttl() {
            return true;
        }
        self.grace_budget = self.grace_budget.saturating_sub(1);
        if self.grace_budget == 0 {
            return true;
        }
        self.hits += 1;
        self.last_outcome = Some(Outcome::Hit);
        false
    }

    pub fn mark_fetched(&mut self, now: DateTime<Utc>) {
        self.fetched_at = Some(now);
        self.grace_budget = self.policy.grace_passes;
        self.last_error = None;
        self.last_outcome = Some(Outcome::Fetched);
        self.fetches += 1;
    }

    /// Remember a failed fetch. Age and budget are left as they were, so
    /// whatever made this pass fetch still holds on the next one.
    pub fn mark_failed(&mut self, error: String) {
        self.last_error = Some(error);
        self.last_outcome = Some(Outcome::Failed);
        self.failures += 1;
    }

    /// Restore the full grace budget. Does not force a fetch by itself.
    pub fn invalidate(&mut self) {
        self.grace_budget = self.policy.grace_passes;
    }

    /// Spend the whole budget so the next decision fetches.
    pub fn force_refetch(&mut self) {
        self.grace_budget = 0;
    }
}

/// A cached value together with its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: Option<V>,
    state: EntryState,
}

impl<V> CacheEntry<V> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            value: None,
            state: EntryState::new(policy),
        }
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn state(&self) -> &EntryState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EntryState {
        &mut self.state
    }

    /// Store a freshly decoded value.
    pub fn record_at(&mut self, value: V, now: DateTime<Utc>) {
        self.value = Some(value);
        self.state.mark_fetched(now);
    }
}
