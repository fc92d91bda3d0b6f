//! File-backed settings store
//!
//! The whole table lives in one document (JSON by default) that is rewritten
//! atomically after every mutation. Reads are served from memory.

use super::table::Table;
use super::{SettingRecord, SettingsStore, StoreEvent, StoreEvents};
use crate::error::Result;
use crate::storage::{JsonStorage, StorageBackend};
use crate::sync::RwLockExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// On-disk document layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    settings: Vec<SettingRecord>,
}

/// Settings table persisted to a single file
pub struct FileStore<S: StorageBackend = JsonStorage> {
    path: PathBuf,
    storage: S,
    table: RwLock<Table>,
    events: StoreEvents,
}

impl<S: StorageBackend> std::fmt::Debug for FileStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileStore<JsonStorage> {
    /// Open (or lazily create) a pretty-printed JSON settings file.
    ///
    /// Supports `~` expansion for home directory. The file itself is only
    /// written on the first mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_storage(path, JsonStorage::new())
    }
}

impl<S: StorageBackend> FileStore<S> {
    /// Open a settings file using a specific storage format
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn with_storage(path: impl Into<PathBuf>, storage: S) -> Result<Self> {
        let path = expand_home(path.into());
        let table = load_table(&storage, &path)?;
        info!(
            "Opened {} settings file at: {}",
            storage.extension(),
            path.display()
        );

        Ok(Self {
            path,
            storage,
            table: RwLock::new(table),
            events: StoreEvents::new(),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, picking up edits made by other processes or tools.
    ///
    /// Emits one event per record that appeared, changed or disappeared, so
    /// observers (caches) see external edits like any other mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn reload(&self) -> Result<usize> {
        let changes = self.events.commit(|| {
            let fresh = load_table(&self.storage, &self.path)?;
            let mut table = self.table.write_recovered();
            let mut events = Vec::new();
            for record in fresh.records() {
                match table.get(&record.key) {
                    None => events.push(StoreEvent::created(record)),
                    Some(old) if old != record => events.push(StoreEvent::updated(record)),
                    Some(_) => {}
                }
            }
            for record in table.records() {
                if fresh.get(&record.key).is_none() {
                    events.push(StoreEvent::deleted(record));
                }
            }
            *table = fresh;
            Ok((events.len(), events))
        })?;

        debug!("Reloaded {}: {changes} change(s)", self.path.display());
        Ok(changes)
    }

    /// Apply `change` to a copy of the table, persist it, then commit.
    ///
    /// The in-memory table is left untouched if the write fails.
    fn mutate<R>(&self, change: impl FnOnce(&mut Table) -> Result<R>) -> Result<R> {
        let mut table = self.table.write_recovered();
        let mut next = table.clone();
        let outcome = change(&mut next)?;

        let document = StoreDocument {
            settings: next.records(),
        };
        self.storage.write(&self.path, &document)?;
        *table = next;
        Ok(outcome)
    }
}

impl<S: StorageBackend> SettingsStore for FileStore<S> {
    fn get(&self, key: &str) -> Result<Option<SettingRecord>> {
        Ok(self.table.read_recovered().get(key))
    }

    fn get_or_create(&self, defaults: SettingRecord) -> Result<(SettingRecord, bool)> {
        if let Some(existing) = self.table.read_recovered().get(&defaults.key) {
            return Ok((existing, false));
        }

        self.events.commit(|| {
            let (record, event) = self.mutate(|table| table.get_or_create(defaults))?;
            let created = event.is_some();
            Ok(((record, created), event.into_iter().collect()))
        })
    }

    fn update(&self, record: &SettingRecord) -> Result<()> {
        self.events.commit(|| {
            let event = self.mutate(|table| table.update(record))?;
            Ok(((), vec![event]))
        })
    }

    fn delete(&self, key: &str) -> Result<SettingRecord> {
        self.events.commit(|| {
            let event = self.mutate(|table| table.delete(key))?;
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
        "file"
    }
}

fn load_table<S: StorageBackend>(storage: &S, path: &Path) -> Result<Table> {
    let document: StoreDocument = storage.read(path)?.unwrap_or_default();
    Table::from_records(document.settings)
}

/// Expand a leading `~` to the home directory
fn expand_home(path: PathBuf) -> PathBuf {
    if !path.starts_with("~") {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(path.strip_prefix("~").unwrap_or(&path)),
        None => path,
    }
}

// =============================================================================
// Tests
// =============================================================================
