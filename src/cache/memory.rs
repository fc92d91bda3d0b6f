//! In-process cache backends

use super::CacheBackend;
use crate::error::{Error, Result};
use crate::sync::MutexExt;
use crate::value::SettingValue;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: SettingValue,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// In-memory expiring cache
///
/// Unbounded by default; [`MemoryCache::bounded`] evicts the least recently
/// used entry once full. Expired entries are dropped lazily on read.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an unbounded cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Create a cache holding at most `max_entries`
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `max_entries` is 0.
    pub fn bounded(max_entries: usize) -> Result<Self> {
        let size = NonZeroUsize::new(max_entries)
            .ok_or_else(|| Error::Config("LRU cache size must be greater than 0".into()))?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(size)),
        })
    }

    /// Number of entries currently held (expired ones included until touched)
    pub fn len(&self) -> usize {
        self.entries.lock_recovered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<SettingValue>> {
        let mut entries = self.entries.lock_recovered();
        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(Instant::now()) => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }
        entries.pop(key);
        Ok(None)
    }

    fn set(&self, key: &str, value: SettingValue, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries
            .lock_recovered()
            .put(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock_recovered().pop(key);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let mut entries = self.entries.lock_recovered();
        let doomed: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        Ok(doomed.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Cache that never holds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CacheBackend for NoCache {
    fn get(&self, _key: &str) -> Result<Option<SettingValue>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: SettingValue, _ttl: Option<Duration>) -> Result<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn delete_prefix(&self, _prefix: &str) -> Result<usize> {
        Ok(0)
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_memory_set_get_delete() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());

        cache.set("a", SettingValue::Int(1), None).unwrap();
        cache.set("b", SettingValue::Bool(true), None).unwrap();

        assert_eq!(cache.get("a").unwrap(), Some(SettingValue::Int(1)));
        assert_eq!(cache.get("c").unwrap(), None);

        cache.delete("a").unwrap();
        cache.delete("never-set").unwrap();
        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_memory_overwrite() {
        let cache = MemoryCache::new();
        cache.set("k", SettingValue::Int(1), None).unwrap();
        cache.set("k", SettingValue::Str("two".into()), None).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(SettingValue::Str("two".into())));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_memory_expiry() {
        let cache = MemoryCache::new();
        cache
            .set("short", SettingValue::Int(1), Some(Duration::from_millis(20)))
            .unwrap();
        cache
            .set("long", SettingValue::Int(2), Some(Duration::from_secs(3600)))
            .unwrap();

        thread::sleep(Duration::from_millis(50));

        assert_eq!(cache.get("short").unwrap(), None);
        assert_eq!(cache.get("long").unwrap(), Some(SettingValue::Int(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_not_cached() {
        let cache = MemoryCache::new();
        cache.set("k", SettingValue::Int(1), Some(Duration::ZERO)).unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache
            .set("k", SettingValue::Int(1), Some(Duration::MAX))
            .unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(SettingValue::Int(1)));
    }

    #[test]
    fn test_bounded_evicts_least_recent() {
        let cache = MemoryCache::bounded(2).unwrap();
        cache.set("a", SettingValue::Int(1), None).unwrap();
        cache.set("b", SettingValue::Int(2), None).unwrap();

        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").unwrap().is_some());
        cache.set("c", SettingValue::Int(3), None).unwrap();

        assert_eq!(cache.get("b").unwrap(), None);
        assert!(cache.get("a").unwrap().is_some());
        assert!(cache.get("c").unwrap().is_some());
        assert!(MemoryCache::bounded(0).is_err());
    }

    #[test]
    fn test_delete_prefix() {
        let cache = MemoryCache::new();
        cache.set("simple_settings:a", SettingValue::Int(1), None).unwrap();
        cache.set("simple_settings:b", SettingValue::Int(2), None).unwrap();
        cache.set("other:a", SettingValue::Int(3), None).unwrap();

        assert_eq!(cache.delete_prefix("simple_settings:").unwrap(), 2);
        assert_eq!(cache.get("simple_settings:a").unwrap(), None);
        assert_eq!(cache.get("other:a").unwrap(), Some(SettingValue::Int(3)));
    }

    #[test]
    fn test_no_cache_holds_nothing() {
        let cache = NoCache;
        cache.set("k", SettingValue::Int(1), None).unwrap();
        assert_eq!(cache.get("k").unwrap(), None);
        assert_eq!(cache.delete_prefix("").unwrap(), 0);
    }
}
