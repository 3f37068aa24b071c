//! The engine context: configuration, cache and gateway in one owned value.
//!
//! There are no globals. The process root builds one [`Engine`] and moves it
//! into each pass; whoever holds it is the only one touching the cache.

use crate::gateway::{Gateway, GatewayCall};
use serde_json::Value;
use spotdeck_core::{ConfigError, GatewayError, PanelConfig, Selectors};
use spotdeck_storage::{CacheStats, ResourceCache};
use std::fmt;
use std::sync::Arc;

pub struct Engine {
    config: PanelConfig,
    selectors: Selectors,
    cache: ResourceCache,
    gateway: Arc<dyn Gateway>,
    sequence: u64,
}

impl Engine {
    pub fn new(config: PanelConfig, gateway: Arc<dyn Gateway>) -> Result<Self, ConfigError> {
        config.validate()?;
        let selectors = config.selectors()?;
        let cache = ResourceCache::new(&config.cache);
        Ok(Self {
            config,
            selectors,
            cache,
            gateway,
            sequence: 0,
        })
    }

    /// Continue view numbering after `sequence`, for an engine replacing one
    /// lost with a failed pass.
    pub fn continuing_after(mut self, sequence: u64) -> Self {
        self.sequence = self.sequence.max(sequence);
        self
    }

    pub fn gateway(&self) -> Arc<dyn Gateway> {
        Arc::clone(&self.gateway)
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResourceCache {
        &mut self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Sequence number of the most recently built view (0 before the first).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub(crate) async fn invoke(&self, call: GatewayCall) -> Result<Value, GatewayError> {
        let operation = call.operation;
        let result = self.gateway.invoke(call).await;
        match &result {
            Ok(_) => tracing::debug!(operation = %operation, "gateway call succeeded"),
            Err(e) => tracing::warn!(operation = %operation, error = %e, "gateway call failed"),
        }
        result
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("region", &self.config.region)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
