//! Resource cache with bounded staleness.
//!
//! Each [`Category`](spotdeck_core::Category) has its own entry and policy.
//! A value is served from cache for at most `grace_passes` refresh passes and
//! never past its TTL. Failed fetches keep the last good value and mark it
//! stale instead of clearing it.

pub mod entry;
pub mod freshness;
pub mod resource_cache;
pub mod stats;

pub use entry::{CacheEntry, EntryState, Outcome};
pub use freshness::{format_age, CacheRead};
pub use resource_cache::{Cacheable, ResourceCache};
pub use stats::{CacheStats, EntryStats};
