//! Persistent settings store
//!
//! A store is a durable table of `key -> (raw value, type)` records with a
//! unique key. Every implementation:
//!
//! - validates a record before writing it (see [`SettingRecord::validate`])
//! - emits a [`StoreEvent`] through its [`StoreEvents`] after each successful
//!   create, update or delete, before the mutating call returns
//! - runs each mutation inside [`StoreEvents::commit`], so events reach
//!   observers in the order the mutations were applied
//!
//! Any code that mutates a store (the manager, an admin tool, a migration)
//! therefore drives the same cache update path.

mod events;
mod file;
mod memory;
mod table;

pub use events::{MutationKind, StoreCallback, StoreEvent, StoreEvents, SubscriptionId};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use crate::value::{self, SettingValue, ValueType};
use serde::{Deserialize, Serialize};

/// Maximum key length in characters
pub const MAX_KEY_LENGTH: usize = 255;

/// Maximum raw value length in characters
pub const MAX_VALUE_LENGTH: usize = 255;

/// A persisted setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    /// Raw string form of the value
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub value_type: ValueType,
}

impl SettingRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            value_type,
        }
    }

    /// Build a record by encoding a typed value
    pub fn from_value(key: impl Into<String>, value: &SettingValue) -> Self {
        let (raw, value_type) = value::encode(value);
        Self::new(key, raw, value_type)
    }

    /// Replace the raw value and type with the encoding of `value`
    pub fn set_value(&mut self, value: &SettingValue) {
        let (raw, value_type) = value::encode(value);
        self.value = raw;
        self.value_type = value_type;
    }

    /// Decode the raw value according to its type
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidValue` if a numeric value does not parse.
    pub fn to_value(&self) -> Result<SettingValue> {
        value::decode(&self.value, self.value_type)
    }

    /// Strict check applied before the record is written
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the key is empty or too long, the value
    /// is too long, or the value does not parse as its type.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::Validation {
                key: self.key.clone(),
                reason: "Key must not be empty".into(),
            });
        }
        if self.key.chars().count() > MAX_KEY_LENGTH {
            return Err(Error::Validation {
                key: self.key.clone(),
                reason: format!("Key is longer than {MAX_KEY_LENGTH} characters"),
            });
        }
        if self.value.chars().count() > MAX_VALUE_LENGTH {
            return Err(Error::Validation {
                key: self.key.clone(),
                reason: format!("Value is longer than {MAX_VALUE_LENGTH} characters"),
            });
        }
        value::validate(&self.key, &self.value, self.value_type)
    }
}

/// Trait for durable settings tables
///
/// Implementations must be safe for concurrent use and must perform every
/// mutation inside `self.events().commit(..)`. Concurrent writers to one key
/// race and the last one wins, in the store and in any cache fed by its
/// events.
pub trait SettingsStore: Send + Sync {
    /// Fetch a record by key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<SettingRecord>>;

    /// Return the record stored under `defaults.key`, inserting `defaults`
    /// if there is none. The flag is `true` when the record was created.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `defaults` would be inserted but is
    /// invalid, or a storage error.
    fn get_or_create(&self, defaults: SettingRecord) -> Result<(SettingRecord, bool)>;

    /// Overwrite an existing record
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for an invalid record and
    /// `Error::KeyNotFound` if no record has this key.
    fn update(&self, record: &SettingRecord) -> Result<()>;

    /// Remove a record, returning it
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if no record has this key.
    fn delete(&self, key: &str) -> Result<SettingRecord>;

    /// All records, ordered by key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn list_all(&self) -> Result<Vec<SettingRecord>>;

    /// Mutation observers for this store
    fn events(&self) -> &StoreEvents;

    /// Backend name for logging/debugging
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_value() {
        let record = SettingRecord::from_value("ratio", &SettingValue::Float(0.5));
        assert_eq!(record.value, "0.5");
        assert_eq!(record.value_type, ValueType::Float);
        assert_eq!(record.to_value().unwrap(), SettingValue::Float(0.5));
    }

    #[test]
    fn test_record_set_value_changes_type() {
        let mut record = SettingRecord::from_value("x", &SettingValue::Int(1));
        record.set_value(&SettingValue::Str("one".into()));
        assert_eq!(record, SettingRecord::new("x", "one", ValueType::Str));
    }

    #[test]
    fn test_record_validation() {
        assert!(SettingRecord::new("flag", "TRUE", ValueType::Bool).validate().is_ok());
        assert!(SettingRecord::new("flag", "on", ValueType::Bool).validate().is_err());
        assert!(SettingRecord::new("port", "80a", ValueType::Int).validate().is_err());
        assert!(SettingRecord::new("", "x", ValueType::Str).validate().is_err());
        assert!(SettingRecord::new("k".repeat(256), "x", ValueType::Str).validate().is_err());
        assert!(SettingRecord::new("k".repeat(255), "x", ValueType::Str).validate().is_ok());
        assert!(SettingRecord::new("k", "v".repeat(256), ValueType::Str).validate().is_err());
    }

    #[test]
    fn test_record_serde_defaults() {
        let record: SettingRecord = serde_json::from_str(r#"{"key": "name"}"#).unwrap();
        assert_eq!(record, SettingRecord::new("name", "", ValueType::Str));
    }
}
