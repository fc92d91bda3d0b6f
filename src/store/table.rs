//! Unique-key record table shared by the store implementations

use super::{SettingRecord, StoreEvent};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    rows: BTreeMap<String, SettingRecord>,
}

impl Table {
    /// Rebuild a table from persisted records, rejecting duplicate keys and
    /// records that would fail validation on write
    pub(crate) fn from_records(records: Vec<SettingRecord>) -> Result<Self> {
        let mut rows = BTreeMap::new();
        for record in records {
            record
                .validate()
                .map_err(|e| Error::Parse(format!("invalid setting '{}': {e}", record.key)))?;
            if rows.contains_key(&record.key) {
                return Err(Error::Parse(format!("duplicate setting key '{}'", record.key)));
            }
            rows.insert(record.key.clone(), record);
        }
        Ok(Self { rows })
    }

    pub(crate) fn get(&self, key: &str) -> Option<SettingRecord> {
        self.rows.get(key).cloned()
    }

    pub(crate) fn records(&self) -> Vec<SettingRecord> {
        self.rows.values().cloned().collect()
    }

    /// Returns the stored record, or inserts `defaults` and the creation event
    pub(crate) fn get_or_create(
        &mut self,
        defaults: SettingRecord,
    ) -> Result<(SettingRecord, Option<StoreEvent>)> {
        if let Some(existing) = self.rows.get(&defaults.key) {
            return Ok((existing.clone(), None));
        }
        defaults.validate()?;
        self.rows.insert(defaults.key.clone(), defaults.clone());
        Ok((defaults.clone(), Some(StoreEvent::created(defaults))))
    }

    pub(crate) fn update(&mut self, record: &SettingRecord) -> Result<StoreEvent> {
        record.validate()?;
        let slot = self
            .rows
            .get_mut(&record.key)
            .ok_or_else(|| Error::KeyNotFound(record.key.clone()))?;
        *slot = record.clone();
        Ok(StoreEvent::updated(record.clone()))
    }

    pub(crate) fn delete(&mut self, key: &str) -> Result<StoreEvent> {
        self.rows
            .remove(key)
            .map(StoreEvent::deleted)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }
}
