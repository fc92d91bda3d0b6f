use crate::cache::CacheBackend;
use crate::config::SettingsConfig;
use crate::error::Result;
use crate::manager::builder::SettingsManagerBuilder;
use crate::manager::cache::{CacheInvalidator, SettingsCache};
use crate::store::{SettingsStore, SubscriptionId};

use log::info;
use std::sync::Arc;

/// Typed settings manager with read-through and write-through caching.
///
/// The `SettingsManager` sits between application code and a
/// [`SettingsStore`]:
///
/// - **Reads** check the cache first and fall back to the store on a miss,
///   populating the cache with the decoded value
/// - **Writes** go to the store, whose mutation event writes the new value
///   into the cache before the call returns
/// - Events from anything else holding the same store update the cache the
///   same way, in the order the store applied them
///
/// # Example
///
/// ```rust
/// use simple_settings::{MemoryCache, MemoryStore, SettingValue, SettingsConfig, SettingsManager};
/// use std::sync::Arc;
///
/// let manager = SettingsManager::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(MemoryCache::new()),
///     SettingsConfig::default(),
/// )?;
///
/// manager.set_item("max_upload_mb", 25)?;
/// assert_eq!(manager.get_item("max_upload_mb")?, Some(SettingValue::Int(25)));
/// # Ok::<(), simple_settings::Error>(())
/// ```
pub struct SettingsManager {
    /// Configuration
    pub(crate) config: SettingsConfig,

    /// Durable settings table
    pub(crate) store: Arc<dyn SettingsStore>,

    /// Namespaced cache view
    pub(crate) cache: SettingsCache,

    /// Our invalidation observer on `store`
    invalidation: SubscriptionId,
}

impl SettingsManager {
    /// Create a manager over an explicit store and cache.
    ///
    /// Registers a [`CacheInvalidator`] on the store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        cache: Arc<dyn CacheBackend>,
        config: SettingsConfig,
    ) -> Result<Self> {
        config.validate()?;

        let cache = SettingsCache::new(cache, &config);
        let invalidation = CacheInvalidator::attach_cache(store.as_ref(), cache.clone());

        info!(
            "Initialized SettingsManager ({} store, {} cache, namespace '{}')",
            store.backend_name(),
            cache.backend().backend_name(),
            config.cache_key_namespace
        );

        Ok(Self {
            config,
            store,
            cache,
            invalidation,
        })
    }

    /// Create a builder for `SettingsManager` with a fluent API.
    ///
    /// # Example
    ///
    /// ```rust
    /// use simple_settings::{CacheStrategy, MemoryStore, SettingsManager};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let manager = SettingsManager::builder(Arc::new(MemoryStore::new()))
    ///     .cache_timeout(Duration::from_secs(600))
    ///     .cache_strategy(CacheStrategy::Lru(1000))
    ///     .build()?;
    /// # Ok::<(), simple_settings::Error>(())
    /// ```
    pub fn builder(store: Arc<dyn SettingsStore>) -> SettingsManagerBuilder {
        SettingsManagerBuilder::new(store)
    }

    /// Get the configuration
    pub fn config(&self) -> &SettingsConfig {
        &self.config
    }

    /// Get the settings store
    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Get the cache backend
    pub fn cache(&self) -> &Arc<dyn CacheBackend> {
        self.cache.backend()
    }

    /// Cache key used for a setting
    pub fn cache_key(&self, key: &str) -> String {
        self.cache.key(key)
    }
}

impl Drop for SettingsManager {
    fn drop(&mut self) {
        self.store.events().unsubscribe(self.invalidation);
    }
}
