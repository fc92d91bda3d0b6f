//! In-memory settings store (not persisted)

use super::table::Table;
use super::{SettingRecord, SettingsStore, StoreEvents};
use crate::error::Result;
use crate::sync::RwLockExt;
use std::sync::RwLock;

/// Settings table held in process memory
///
/// Useful for tests and for applications that seed settings at startup.
pub struct MemoryStore {
    table: RwLock<Table>,
    events: StoreEvents,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
            events: StoreEvents::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<SettingRecord>> {
        Ok(self.table.read_recovered().get(key))
    }

    fn get_or_create(&self, defaults: SettingRecord) -> Result<(SettingRecord, bool)> {
        self.events.commit(|| {
            let (record, event) = self.table.write_recovered().get_or_create(defaults)?;
            let created = event.is_some();
            Ok(((record, created), event.into_iter().collect()))
        })
    }

    fn update(&self, record: &SettingRecord) -> Result<()> {
        self.events.commit(|| {
            let event = self.table.write_recovered().update(record)?;
            Ok(((), vec![event]))
        })
    }

    fn delete(&self, key: &str) -> Result<SettingRecord> {
        self.events.commit(|| {
            let event = self.table.write_recovered().delete(key)?;
            Ok((event.record.clone(), vec![event]))
        })
    }

    fn list_all(&self) -> Result<Vec<SettingRecord>> {
        Ok(self.table.read_recovered().records())
    }

    fn events(&self) -> &StoreEvents {
        &self.events
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
