//! Cache layer fronting the settings store
//!
//! The cache is strictly an optimization: a missing entry never means a
//! missing setting. Backends implement [`CacheBackend`]; the manager picks one
//! by alias from a [`CacheRegistry`].
//!
//! - [`MemoryCache`]: in-process, expiring entries, optionally LRU-bounded
//! - [`NoCache`]: stores nothing, every read goes to the store

mod memory;

pub use memory::{MemoryCache, NoCache};

use crate::error::{Error, Result};
use crate::sync::RwLockExt;
use crate::value::SettingValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Trait for expiring key/value cache backends
///
/// Implementations must be safe to share between threads. Ordering between
/// concurrent `set` and `delete` on one key is whatever the backend gives
/// (last write wins is fine).
pub trait CacheBackend: Send + Sync {
    /// Fetch a live entry
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn get(&self, key: &str) -> Result<Option<SettingValue>>;

    /// Store an entry. `None` means no expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn set(&self, key: &str, value: SettingValue, ttl: Option<Duration>) -> Result<()>;

    /// Drop a single entry (no-op when absent)
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn delete(&self, key: &str) -> Result<()>;

    /// Drop every entry whose key starts with `prefix`, returning how many went
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn delete_prefix(&self, prefix: &str) -> Result<usize>;

    /// Backend name for logging/debugging
    fn backend_name(&self) -> &'static str;
}

/// Cache strategy used to build the default backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    /// Keep every entry until it expires (default)
    #[default]
    Full,
    /// LRU cache with maximum entries
    Lru(usize),
    /// No caching - always read from the store
    None,
}

impl CacheStrategy {
    /// Validate cache strategy configuration
    ///
    /// # Errors
    ///
    /// Returns error if LRU size is 0
    pub fn validate(&self) -> Result<()> {
        match self {
            CacheStrategy::Lru(0) => Err(Error::Config(
                "LRU cache size must be greater than 0".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Build a backend for this strategy
    ///
    /// # Errors
    ///
    /// Returns error if the strategy is invalid.
    pub fn build(self) -> Result<Arc<dyn CacheBackend>> {
        self.validate()?;
        Ok(match self {
            CacheStrategy::Full => Arc::new(MemoryCache::new()),
            CacheStrategy::Lru(size) => Arc::new(MemoryCache::bounded(size)?),
            CacheStrategy::None => Arc::new(NoCache),
        })
    }
}

/// Named cache backends, looked up by alias
#[derive(Default)]
pub struct CacheRegistry {
    backends: RwLock<HashMap<String, Arc<dyn CacheBackend>>>,
}

impl CacheRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the backend for `alias`
    pub fn register(&self, alias: impl Into<String>, backend: Arc<dyn CacheBackend>) {
        let alias = alias.into();
        log::debug!("Registered {} cache as '{alias}'", backend.backend_name());
        self.backends.write_recovered().insert(alias, backend);
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with(self, alias: impl Into<String>, backend: Arc<dyn CacheBackend>) -> Self {
        self.register(alias, backend);
        self
    }

    /// Look up the backend registered under `alias`
    ///
    /// # Errors
    ///
    /// Returns `Error::CacheAliasNotFound` if nothing is registered under it.
    pub fn get(&self, alias: &str) -> Result<Arc<dyn CacheBackend>> {
        self.backends
            .read_recovered()
            .get(alias)
            .cloned()
            .ok_or_else(|| Error::CacheAliasNotFound(alias.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_validation() {
        assert!(CacheStrategy::Full.validate().is_ok());
        assert!(CacheStrategy::Lru(16).validate().is_ok());
        assert!(CacheStrategy::None.validate().is_ok());
        assert!(matches!(
            CacheStrategy::Lru(0).validate(),
            Err(Error::Config(_))
        ));
        assert!(CacheStrategy::Lru(0).build().is_err());
    }

    #[test]
    fn test_strategy_builds_backend() {
        assert_eq!(CacheStrategy::Full.build().unwrap().backend_name(), "memory");
        assert_eq!(CacheStrategy::Lru(2).build().unwrap().backend_name(), "memory");
        assert_eq!(CacheStrategy::None.build().unwrap().backend_name(), "none");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = CacheRegistry::new()
            .with("default", Arc::new(MemoryCache::new()))
            .with("off", Arc::new(NoCache));

        assert_eq!(registry.get("off").unwrap().backend_name(), "none");
        assert_eq!(registry.get("default").unwrap().backend_name(), "memory");

        let err = registry.get("redis").err().unwrap();
        assert!(matches!(err, Error::CacheAliasNotFound(ref a) if a == "redis"));
    }

    #[test]
    fn test_registry_shares_backend() {
        let registry = CacheRegistry::new().with("default", Arc::new(MemoryCache::new()));
        let a = registry.get("default").unwrap();
        let b = registry.get("default").unwrap();

        a.set("k", SettingValue::Int(1), None).unwrap();
        assert_eq!(b.get("k").unwrap(), Some(SettingValue::Int(1)));
    }
}
