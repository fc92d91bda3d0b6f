//! Settings manager
//!
//! [`SettingsManager`] orchestrates the codec, cache and store:
//!
//! - `core` - the struct, construction and accessors
//! - `operations` - typed get/set/delete and bulk materialization
//! - `cache` - namespaced cache access and store-driven invalidation
//! - `builder` - fluent construction with cache selection by alias

mod builder;
mod cache;
mod core;
mod operations;

pub use builder::SettingsManagerBuilder;
pub use cache::CacheInvalidator;
pub use self::core::SettingsManager;
