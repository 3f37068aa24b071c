//! SPOTDECK Storage - Resource Cache
//!
//! Holds the most recent decoded value per resource category and decides,
//! pass by pass, whether it may be served or must be fetched again.

pub mod cache;

pub use cache::{
    format_age, CacheEntry, CacheRead, CacheStats, Cacheable, EntryState, EntryStats, Outcome,
    ResourceCache,
};
