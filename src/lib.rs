//! # simple-settings
//!
//! A typed, cached, dynamically updatable key/value settings store.
//!
//! ## Features
//!
//! - **Typed values**: booleans, floats, integers and strings, stored as
//!   `(raw string, type)` and validated before they are written
//! - **Read-through / write-through cache**: reads hit the cache first, writes
//!   update store and cache before returning
//! - **Store-driven cache updates**: stores notify observers of every
//!   mutation in commit order, so edits from admin tools or other managers
//!   reach the cache too
//! - **Pluggable backends**: any [`SettingsStore`] and any [`CacheBackend`],
//!   selectable by alias through a [`CacheRegistry`]
//! - **Lazy facade**: [`LazySettings`] falls back to static defaults when a
//!   key is not stored
//!
//! ## Quick Start
//!
//! ```rust
//! use simple_settings::{LazySettings, MapDefaults, MemoryStore, SettingValue, SettingsManager};
//! use std::sync::Arc;
//!
//! let manager = SettingsManager::builder(Arc::new(MemoryStore::new())).build()?;
//! let settings = LazySettings::new(
//!     Arc::new(manager),
//!     MapDefaults::new().with("SITE_NAME", "example.org"),
//! );
//!
//! // Not stored yet: static default
//! assert_eq!(settings.lookup("SITE_NAME")?, SettingValue::from("example.org"));
//!
//! // Stored values win
//! settings.set("SITE_NAME", "example.com")?;
//! assert_eq!(settings.lookup("SITE_NAME")?, SettingValue::from("example.com"));
//! # Ok::<(), simple_settings::Error>(())
//! ```
//!
//! ## Persistent Storage
//!
//! ```rust,no_run
//! use simple_settings::{FileStore, SettingsManager};
//! use std::sync::Arc;
//!
//! # fn example() -> simple_settings::Result<()> {
//! let store = Arc::new(FileStore::open("~/.config/my-app/settings.json")?);
//! let manager = SettingsManager::builder(store.clone()).build()?;
//!
//! manager.set_item("maintenance_mode", false)?;
//! let _maintenance: Option<bool> = manager.get("maintenance_mode")?;
//!
//! // Pick up edits another process made to the file; the cache follows
//! store.reload()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Admin Tools
//!
//! Anything that mutates the store goes through the same notification path as
//! the manager, so the cache never serves a value the store no longer has:
//!
//! ```rust
//! use simple_settings::{MemoryStore, SettingRecord, SettingValue, SettingsManager, SettingsStore, ValueType};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let manager = SettingsManager::builder(store.clone()).build()?;
//! manager.set_item("workers", 4)?;
//!
//! // An admin edit straight on the store
//! store.update(&SettingRecord::new("workers", "8", ValueType::Int))?;
//! assert_eq!(manager.get_item("workers")?, Some(SettingValue::Int(8)));
//! # Ok::<(), simple_settings::Error>(())
//! ```

// Core modules
mod error;
mod facade;
mod manager;
pub mod storage;
mod sync;
pub mod value;

// Grouped modules
pub mod cache;
pub mod config;
pub mod store;

// Re-exports from core
pub use error::{Error, Result};
pub use facade::{LazySettings, MapDefaults, NoDefaults, StaticDefaults};
pub use manager::{CacheInvalidator, SettingsManager, SettingsManagerBuilder};
pub use storage::{JsonStorage, StorageBackend};
pub use value::{SettingValue, ValueType};

// Re-exports from grouped modules
pub use cache::{CacheBackend, CacheRegistry, CacheStrategy, MemoryCache, NoCache};
pub use config::{DefaultEnvSource, EnvSource, SettingsConfig, SettingsConfigBuilder};
pub use store::{
    FileStore, MemoryStore, MutationKind, SettingRecord, SettingsStore, StoreEvent, StoreEvents,
};
