use crate::error::{Error, Result};
use crate::manager::core::SettingsManager;
use crate::store::SettingRecord;
use crate::value::SettingValue;

use log::{debug, info};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

impl SettingsManager {
    /// Get a setting value, or `None` if the key is not stored.
    ///
    /// Checks the cache first. On a miss the store is queried and, if the
    /// record exists, its decoded value is cached. Absence is never cached.
    /// The miss path runs with no store commit in progress, so a concurrent
    /// write cannot be overwritten by the value read here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The store cannot be read
    /// - The stored raw value does not decode as its type
    pub fn get_item(&self, key: &str) -> Result<Option<SettingValue>> {
        if let Some(value) = self.cache.lookup(key) {
            debug!("Cache hit for {key}");
            return Ok(Some(value));
        }

        debug!("Cache miss for {key}, reading store");
        self.store
            .events()
            .exclusive(|| -> Result<Option<SettingValue>> {
                let Some(record) = self.store.get(key)? else {
                    return Ok(None);
                };
                let value = record.to_value()?;
                self.cache.populate(key, &value);
                Ok(Some(value))
            })
    }

    /// Get a setting value, or `default` if the key is not stored.
    ///
    /// The default is neither stored nor cached.
    ///
    /// # Errors
    ///
    /// Same as [`get_item`](Self::get_item).
    pub fn get_item_or(&self, key: &str, default: impl Into<SettingValue>) -> Result<SettingValue> {
        Ok(self.get_item(key)?.unwrap_or_else(|| default.into()))
    }

    /// Get a setting converted to `T`.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The type to deserialize the value into (`bool`, `f64`, `u16`,
    ///   `String`, ...)
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` if the stored value does not convert to
    /// `T`, or any error from [`get_item`](Self::get_item).
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(value) = self.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_value(value.to_json())
            .map(Some)
            .map_err(|_| Error::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>().to_string(),
                actual: value.value_type().to_string(),
            })
    }

    /// Whether a setting is stored under `key`
    ///
    /// # Errors
    ///
    /// Same as [`get_item`](Self::get_item).
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key)?.is_some())
    }

    /// Store a setting and cache its value.
    ///
    /// Creates the record on first use and overwrites value and type
    /// afterwards. The store's events write the value into the cache, so the
    /// cache holds it when this returns, and concurrent writers leave store
    /// and cache with the same last value.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record fails validation (`Error::Validation`), e.g. a key or
    ///   value longer than 255 characters
    /// - The store cannot be written
    pub fn set_item(&self, key: &str, value: impl Into<SettingValue>) -> Result<SettingRecord> {
        let value = value.into();

        let (mut record, created) = self
            .store
            .get_or_create(SettingRecord::from_value(key, &value))?;
        if !created {
            record.set_value(&value);
            self.store.update(&record)?;
        }

        info!(
            "{} setting {key} ({})",
            if created { "Created" } else { "Updated" },
            record.value_type
        );
        Ok(record)
    }

    /// Store a setting from an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedType` for `null`, arrays and objects, or any
    /// error from [`set_item`](Self::set_item).
    pub fn set_json(&self, key: &str, value: serde_json::Value) -> Result<SettingRecord> {
        let value = SettingValue::try_from(value)?;
        self.set_item(key, value)
    }

    /// Delete a setting.
    ///
    /// The cache entry is dropped by the store's delete notification.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if no setting is stored under `key`.
    pub fn del_item(&self, key: &str) -> Result<()> {
        self.store.delete(key)?;
        info!("Deleted setting {key}");
        Ok(())
    }

    /// All stored settings, decoded, keyed by setting key.
    ///
    /// Populates the cache for every key as a side effect, with no store
    /// commit in progress. Entries for keys deleted behind the store's back are
    /// not cleared here.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed or a value fails to
    /// decode.
    pub fn to_dict(&self) -> Result<BTreeMap<String, SettingValue>> {
        let result = self
            .store
            .events()
            .exclusive(|| -> Result<BTreeMap<String, SettingValue>> {
                let mut result = BTreeMap::new();
                for record in self.store.list_all()? {
                    let value = record.to_value()?;
                    self.cache.populate(&record.key, &value);
                    result.insert(record.key, value);
                }
                Ok(result)
            })?;
        debug!("Materialized {} settings", result.len());
        Ok(result)
    }

    /// Drop the bulk "all settings" cache marker.
    ///
    /// Per-key entries are left alone; see [`purge_cache`](Self::purge_cache).
    pub fn clear_cache(&self) {
        self.cache.clear_marker();
    }

    /// Drop every cache entry under this manager's namespace.
    ///
    /// Returns the number of entries removed.
    pub fn purge_cache(&self) -> usize {
        let removed = self.cache.purge();
        info!("Purged {removed} cached settings");
        removed
    }
}
