//! Configuration types
//!
//! - `SettingsConfig` - cache timeout, alias, key namespace and strategy
//! - `EnvSource` - where `SettingsConfig::from_env` reads its overrides

mod env;
mod types;

pub use env::{DefaultEnvSource, EnvSource, MapEnvSource};
pub use types::{
    DEFAULT_CACHE_ALIAS, DEFAULT_CACHE_KEY_NAMESPACE, DEFAULT_CACHE_TIMEOUT, ENV_CACHE_ALIAS,
    ENV_CACHE_KEY, ENV_CACHE_TIMEOUT, SettingsConfig, SettingsConfigBuilder,
};
