//! Cache access for `SettingsManager`
//!
//! The cache is never authoritative. Backend failures are logged and treated
//! as misses; the next read through the store repopulates the entry.

use crate::cache::CacheBackend;
use crate::config::SettingsConfig;
use crate::store::{MutationKind, SettingsStore, StoreEvent, SubscriptionId};
use crate::value::SettingValue;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Namespaced view of a cache backend
#[derive(Clone)]
pub(crate) struct SettingsCache {
    backend: Arc<dyn CacheBackend>,
    namespace: String,
    all_key: String,
    ttl: Duration,
}

impl SettingsCache {
    pub(crate) fn new(backend: Arc<dyn CacheBackend>, config: &SettingsConfig) -> Self {
        Self {
            backend,
            namespace: config.cache_key_namespace.clone(),
            all_key: config.all_settings_key(),
            ttl: config.cache_timeout,
        }
    }

    pub(crate) fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub(crate) fn key(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<SettingValue> {
        let cache_key = self.key(key);
        match self.backend.get(&cache_key) {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache read for {cache_key} failed, falling back to store: {e}");
                None
            }
        }
    }

    pub(crate) fn populate(&self, key: &str, value: &SettingValue) {
        let cache_key = self.key(key);
        if let Err(e) = self.backend.set(&cache_key, value.clone(), Some(self.ttl)) {
            warn!("Cache write for {cache_key} failed: {e}");
        }
    }

    pub(crate) fn invalidate(&self, key: &str) {
        self.delete(&self.key(key));
    }

    pub(crate) fn clear_marker(&self) {
        self.delete(&self.all_key);
    }

    pub(crate) fn purge(&self) -> usize {
        match self.backend.delete_prefix(&self.namespace) {
            Ok(count) => count,
            Err(e) => {
                warn!("Cache purge of {} failed: {e}", self.namespace);
                0
            }
        }
    }

    fn delete(&self, cache_key: &str) {
        if let Err(e) = self.backend.delete(cache_key) {
            warn!("Cache delete for {cache_key} failed: {e}");
        }
    }
}

/// Store observer that keeps a cache coherent with the store
///
/// Creates and updates write the new value into the cache, deletes drop the
/// entry, and every event drops the bulk marker. Stores deliver events
/// synchronously and in commit order, so when a mutating call returns the
/// cache holds what the store holds, whichever code path mutated it.
pub struct CacheInvalidator {
    cache: SettingsCache,
}

impl CacheInvalidator {
    /// Subscribe an invalidator for `cache` to `store`'s mutations
    ///
    /// `SettingsManager` does this on construction. Call it directly when a
    /// tool mutates a store whose cache is shared with managers elsewhere.
    pub fn attach(
        store: &dyn SettingsStore,
        cache: Arc<dyn CacheBackend>,
        config: &SettingsConfig,
    ) -> SubscriptionId {
        Self::attach_cache(store, SettingsCache::new(cache, config))
    }

    pub(crate) fn attach_cache(store: &dyn SettingsStore, cache: SettingsCache) -> SubscriptionId {
        let invalidator = Self { cache };
        store
            .events()
            .subscribe(move |event| invalidator.handle(event))
    }

    fn handle(&self, event: &StoreEvent) {
        debug!("Refreshing cache for {} after {:?}", event.key(), event.kind);
        match event.kind {
            MutationKind::Created | MutationKind::Updated => match event.record.to_value() {
                Ok(value) => self.cache.populate(event.key(), &value),
                Err(e) => {
                    warn!("Stored value for {} does not decode: {e}", event.key());
                    self.cache.invalidate(event.key());
                }
            },
            MutationKind::Deleted => self.cache.invalidate(event.key()),
        }
        self.cache.clear_marker();
    }
}
