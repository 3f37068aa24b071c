//! The resource cache: one entry per [`Category`].
//!
//! Freshness decisions are keyed by category. Values are typed: each
//! category stores the decoded records for that category, reached through
//! the [`Cacheable`] trait.

use super::entry::{CacheEntry, EntryState};
use super::freshness::CacheRead;
use super::stats::{CacheStats, EntryStats};
use chrono::{DateTime, Utc};
use spotdeck_core::resources::{Image, Instance, KeyPair, PriceSample, SecurityGroup, SpotRequest};
use spotdeck_core::{CacheTable, Category};

/// A value type stored under exactly one category.
pub trait Cacheable: Sized {
    const CATEGORY: Category;

    fn entry(cache: &ResourceCache) -> &CacheEntry<Self>;

    fn entry_mut(cache: &mut ResourceCache) -> &mut CacheEntry<Self>;
}

#[derive(Debug, Clone)]
pub struct ResourceCache {
    instances: CacheEntry<Vec<Instance>>,
    spot_requests: CacheEntry<Vec<SpotRequest>>,
    images: CacheEntry<Vec<Image>>,
    key_pairs: CacheEntry<Vec<KeyPair>>,
    security_groups: CacheEntry<Vec<SecurityGroup>>,
    spot_prices: CacheEntry<Vec<PriceSample>>,
}

macro_rules! cacheable {
    ($ty:ty, $category:expr, $field:ident) => {
        impl Cacheable for $ty {
            const CATEGORY: Category = $category;

            fn entry(cache: &ResourceCache) -> &CacheEntry<Self> {
                &cache.$field
            }

            fn entry_mut(cache: &mut ResourceCache) -> &mut CacheEntry<Self> {
                &mut cache.$field
            }
        }
    };
}

cacheable!(Vec<Instance>, Category::Instances, instances);
cacheable!(Vec<SpotRequest>, Category::SpotRequests, spot_requests);
cacheable!(Vec<Image>, Category::Images, images);
cacheable!(Vec<KeyPair>, Category::KeyPairs, key_pairs);
cacheable!(Vec<SecurityGroup>, Category::SecurityGroups, security_groups);
cacheable!(Vec<PriceSample>, Category::SpotPrices, spot_prices);

impl ResourceCache {
    pub fn new(table: &CacheTable) -> Self {
        Self {
            instances: CacheEntry::new(table.instances),
            spot_requests: CacheEntry::new(table.spot_requests),
            images: CacheEntry::new(table.images),
            key_pairs: CacheEntry::new(table.key_pairs),
            security_groups: CacheEntry::new(table.security_groups),
            spot_prices: CacheEntry::new(table.spot_prices),
        }
    }

    pub fn state(&self, category: Category) -> &EntryState {
        match category {
            Category::Instances => self.instances.state(),
            Category::SpotRequests => self.spot_requests.state(),
            Category::Images => self.images.state(),
            Category::KeyPairs => self.key_pairs.state(),
            Category::SecurityGroups => self.security_groups.state(),
            Category::SpotPrices => self.spot_prices.state(),
        }
    }

    fn state_mut(&mut self, category: Category) -> &mut EntryState {
        match category {
            Category::Instances => self.instances.state_mut(),
            Category::SpotRequests => self.spot_requests.state_mut(),
            Category::Images => self.images.state_mut(),
            Category::KeyPairs => self.key_pairs.state_mut(),
            Category::SecurityGroups => self.security_groups.state_mut(),
            Category::SpotPrices => self.spot_prices.state_mut(),
        }
    }

    pub fn should_fetch(&mut self, category: Category) -> bool {
        self.should_fetch_at(category, Utc::now())
    }

    pub fn should_fetch_at(&mut self, category: Category, now: DateTime<Utc>) -> bool {
        let state = self.state_mut(category);
        let fetch = state.should_fetch_at(now);
        if !fetch {
            tracing::debug!(
                category = %category,
                grace_budget = state.grace_budget(),
                "serving from cache"
            );
        }
        fetch
    }

    pub fn record<V: Cacheable>(&mut self, value: V) {
        self.record_at(value, Utc::now());
    }

    pub fn record_at<V: Cacheable>(&mut self, value: V, now: DateTime<Utc>) {
        V::entry_mut(self).record_at(value, now);
    }

    pub fn record_failure(&mut self, category: Category, error: impl ToString) {
        self.state_mut(category).mark_failed(error.to_string());
    }

    pub fn invalidate(&mut self, category: Category) {
        self.state_mut(category).invalidate();
    }

    pub fn force_refetch(&mut self, category: Category) {
        self.state_mut(category).force_refetch();
    }

    pub fn value<V: Cacheable>(&self) -> Option<&V> {
        V::entry(self).value()
    }

    /// The held value with its freshness, if one was ever fetched.
    pub fn read<V: Cacheable>(&self) -> Option<CacheRead<'_, V>> {
        let entry = V::entry(self);
        CacheRead::new(entry.value()?, entry.state())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        CacheStats {
            entries: Category::all()
                .iter()
                .map(|&category| EntryStats::from_state(category, self.state(category), now))
                .collect(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats_at(Utc::now())
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new(&CacheTable::default())
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

    fn pair(name: &str) -> KeyPair {
        KeyPair {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_every_category_starts_empty() {
        let mut cache = ResourceCache::default();
        for &category in Category::all() {
            assert!(cache.should_fetch_at(category, t0()));
            assert!(cache.state(category).fetched_at().is_none());
        }
        assert!(cache.value::<Vec<Instance>>().is_none());
    }

    #[test]
    fn test_record_is_typed_by_category() {
        let mut cache = ResourceCache::default();
        cache.record_at(vec![pair("deploy")], t0());

        assert_eq!(cache.value::<Vec<KeyPair>>().map(Vec::len), Some(1));
        assert!(cache.state(Category::KeyPairs).fetched_at().is_some());
        assert!(cache.state(Category::SecurityGroups).fetched_at().is_none());
    }

    #[test]
    fn test_failure_never_clears_value() {
        let mut cache = ResourceCache::default();
        cache.record_at(vec![pair("deploy")], t0());
        cache.force_refetch(Category::KeyPairs);
        assert!(cache.should_fetch_at(Category::KeyPairs, t0()));

        cache.record_failure(Category::KeyPairs, "AuthFailure");
        let read = cache.read::<Vec<KeyPair>>().unwrap();
        assert!(read.is_stale());
        assert_eq!(read.value()[0].name, "deploy");
        assert_eq!(read.error(), Some("AuthFailure"));

        // The forced condition still holds on the next pass.
        assert!(cache.should_fetch_at(Category::KeyPairs, t0()));
    }

    #[test]
    fn test_force_refetch_only_touches_named_category() {
        let mut table = CacheTable::default();
        table.instances = CachePolicy::new(3_600, 10);
        table.spot_requests = CachePolicy::new(3_600, 10);
        let mut cache = ResourceCache::new(&table);
        cache.record_at(Vec::<Instance>::new(), t0());
        cache.record_at(Vec::<SpotRequest>::new(), t0());

        cache.force_refetch(Category::Instances);
        assert!(cache.should_fetch_at(Category::Instances, t0()));
        assert!(!cache.should_fetch_at(Category::SpotRequests, t0()));
    }

    #[test]
    fn test_stats_cover_all_categories() {
        let mut cache = ResourceCache::default();
        cache.record_at(vec![pair("a")], t0());
        let _ = cache.should_fetch_at(Category::KeyPairs, t0());
        let stats = cache.stats_at(t0());

        assert_eq!(stats.entries.len(), Category::all().len());
        let keys = stats.entry(Category::KeyPairs).unwrap();
        assert_eq!(keys.fetches, 1);
        assert_eq!(keys.hits, 1);
    }
}
