//! Common test utilities for simple-settings integration tests
//!
//! Provides shared fixtures, instrumented backends and helper functions.

#![allow(dead_code)]

use simple_settings::{
    CacheBackend, Error, LazySettings, MapDefaults, MemoryCache, MemoryStore, Result,
    SettingRecord, SettingValue, SettingsConfig, SettingsManager, SettingsStore, StoreEvents,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Route library logs to the test harness (`RUST_LOG=debug cargo test`)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Instrumented Backends
// =============================================================================

/// Memory store that counts how often it is read
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    lists: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `list_all` calls so far
    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }
}

impl SettingsStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<SettingRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn get_or_create(&self, defaults: SettingRecord) -> Result<(SettingRecord, bool)> {
        self.inner.get_or_create(defaults)
    }

    fn update(&self, record: &SettingRecord) -> Result<()> {
        self.inner.update(record)
    }

    fn delete(&self, key: &str) -> Result<SettingRecord> {
        self.inner.delete(key)
    }

    fn list_all(&self) -> Result<Vec<SettingRecord>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_all()
    }

    fn events(&self) -> &StoreEvents {
        self.inner.events()
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

/// Memory store that stalls after applying one chosen value
///
/// The stall happens once the update has committed, which lets a test hold a
/// writer between its store write and its return.
pub struct SlowUpdateStore {
    inner: MemoryStore,
    slow_value: String,
    delay: Duration,
}

impl SlowUpdateStore {
    pub fn new(slow_value: impl Into<String>, delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            slow_value: slow_value.into(),
            delay,
        }
    }
}

impl SettingsStore for SlowUpdateStore {
    fn get(&self, key: &str) -> Result<Option<SettingRecord>> {
        self.inner.get(key)
    }

    fn get_or_create(&self, defaults: SettingRecord) -> Result<(SettingRecord, bool)> {
        self.inner.get_or_create(defaults)
    }

    fn update(&self, record: &SettingRecord) -> Result<()> {
        self.inner.update(record)?;
        if record.value == self.slow_value {
            std::thread::sleep(self.delay);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<SettingRecord> {
        self.inner.delete(key)
    }

    fn list_all(&self) -> Result<Vec<SettingRecord>> {
        self.inner.list_all()
    }

    fn events(&self) -> &StoreEvents {
        self.inner.events()
    }

    fn backend_name(&self) -> &'static str {
        "slow"
    }
}

/// Cache whose backend is always unreachable
pub struct FailingCache;

impl CacheBackend for FailingCache {
    fn get(&self, _key: &str) -> Result<Option<SettingValue>> {
        Err(Error::Cache("connection refused".into()))
    }

    fn set(&self, _key: &str, _value: SettingValue, _ttl: Option<Duration>) -> Result<()> {
        Err(Error::Cache("connection refused".into()))
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Err(Error::Cache("connection refused".into()))
    }

    fn delete_prefix(&self, _prefix: &str) -> Result<usize> {
        Err(Error::Cache("connection refused".into()))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Manager, facade and the backends behind them
pub struct TestFixture {
    pub store: Arc<CountingStore>,
    pub cache: Arc<MemoryCache>,
    pub manager: Arc<SettingsManager>,
    pub settings: LazySettings,
}

impl TestFixture {
    /// Fixture with default configuration and no static defaults
    pub fn new() -> Self {
        Self::with_defaults(MapDefaults::new())
    }

    /// Fixture whose facade falls back to `defaults`
    pub fn with_defaults(defaults: MapDefaults) -> Self {
        init_logging();

        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(MemoryCache::new());
        let manager = Arc::new(
            SettingsManager::new(store.clone(), cache.clone(), SettingsConfig::default())
                .expect("Failed to create manager"),
        );
        let settings = LazySettings::new(manager.clone(), defaults);

        Self {
            store,
            cache,
            manager,
            settings,
        }
    }

    /// Raw cache content for a setting key
    pub fn cached(&self, key: &str) -> Option<SettingValue> {
        self.cache
            .get(&self.manager.cache_key(key))
            .expect("memory cache never fails")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
