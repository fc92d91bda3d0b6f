//! Builder for SettingsManager
//!
//! This module contains [`SettingsManagerBuilder`] which provides a fluent API
//! for creating a [`SettingsManager`](super::SettingsManager).

use crate::cache::{CacheBackend, CacheRegistry, CacheStrategy};
use crate::config::{SettingsConfig, SettingsConfigBuilder};
use crate::error::Result;
use crate::store::SettingsStore;
use std::sync::Arc;
use std::time::Duration;

use super::SettingsManager;

/// Builder for creating a [`SettingsManager`] with a fluent API.
///
/// The cache backend is resolved in this order:
///
/// 1. a backend passed to [`cache`](Self::cache)
/// 2. the registry entry for the configured alias, if a registry was given
///    (an unknown alias is an error)
/// 3. a fresh backend built from the configured [`CacheStrategy`]
///
/// # Example
///
/// ```rust
/// use simple_settings::{CacheRegistry, MemoryCache, MemoryStore, SettingsManager};
/// use std::sync::Arc;
///
/// let registry = Arc::new(
///     CacheRegistry::new().with("shared", Arc::new(MemoryCache::new())),
/// );
///
/// let manager = SettingsManager::builder(Arc::new(MemoryStore::new()))
///     .cache_registry(registry)
///     .cache_alias("shared")
///     .build()?;
/// # Ok::<(), simple_settings::Error>(())
/// ```
pub struct SettingsManagerBuilder {
    store: Arc<dyn SettingsStore>,
    config_builder: SettingsConfigBuilder,
    registry: Option<Arc<CacheRegistry>>,
    cache: Option<Arc<dyn CacheBackend>>,
}

impl SettingsManagerBuilder {
    /// Create a new builder over `store`.
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            config_builder: SettingsConfigBuilder::new(),
            registry: None,
            cache: None,
        }
    }

    /// Replace every configuration option at once.
    pub fn config(mut self, config: SettingsConfig) -> Self {
        self.config_builder = SettingsConfigBuilder::new()
            .cache_timeout(config.cache_timeout)
            .cache_alias(config.cache_alias)
            .cache_key_namespace(config.cache_key_namespace)
            .cache_strategy(config.cache_strategy);
        self
    }

    /// Set the lifetime of cached values (default: 24h).
    pub fn cache_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.cache_timeout(timeout);
        self
    }

    /// Select the cache backend by alias (default: "default").
    pub fn cache_alias(mut self, alias: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.cache_alias(alias);
        self
    }

    /// Set the cache key prefix (default: "simple_settings:").
    pub fn cache_key_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.cache_key_namespace(namespace);
        self
    }

    /// Strategy for the cache built when no backend is given.
    pub fn cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.config_builder = self.config_builder.cache_strategy(strategy);
        self
    }

    /// Look the cache backend up by alias in `registry`.
    pub fn cache_registry(mut self, registry: Arc<CacheRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use this cache backend, ignoring alias and strategy.
    pub fn cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the [`SettingsManager`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the alias is not
    /// registered in the given registry.
    pub fn build(self) -> Result<SettingsManager> {
        let config = self.config_builder.build();
        config.validate()?;

        let cache = match (self.cache, self.registry) {
            (Some(cache), _) => cache,
            (None, Some(registry)) => registry.get(&config.cache_alias)?,
            (None, None) => config.cache_strategy.build()?,
        };

        SettingsManager::new(self.store, cache, config)
    }
}
