//! Configuration for the settings manager

use super::env::EnvSource;
use crate::cache::CacheStrategy;
use crate::error::{Error, Result};
use std::time::Duration;

/// Default cache entry lifetime: one day
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24);

/// Default cache alias
pub const DEFAULT_CACHE_ALIAS: &str = "default";

/// Default prefix of every cache key
pub const DEFAULT_CACHE_KEY_NAMESPACE: &str = "simple_settings:";

/// Environment variable overriding the cache timeout (seconds)
pub const ENV_CACHE_TIMEOUT: &str = "SIMPLE_SETTINGS_CACHE_TIMEOUT";

/// Environment variable overriding the cache alias
pub const ENV_CACHE_ALIAS: &str = "SIMPLE_SETTINGS_CACHE_ALIAS";

/// Environment variable overriding the cache key namespace
pub const ENV_CACHE_KEY: &str = "SIMPLE_SETTINGS_CACHE_KEY";

/// Suffix of the bulk "all settings" cache marker
const ALL_MARKER: &str = "all";

/// Configuration for initializing the `SettingsManager`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsConfig {
    /// Lifetime of cached values
    pub cache_timeout: Duration,

    /// Which registered cache backend to use
    pub cache_alias: String,

    /// Prefix prepended to every setting key in the cache
    pub cache_key_namespace: String,

    /// Strategy used to build the cache when none is registered under
    /// `cache_alias`
    pub cache_strategy: CacheStrategy,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            cache_alias: DEFAULT_CACHE_ALIAS.into(),
            cache_key_namespace: DEFAULT_CACHE_KEY_NAMESPACE.into(),
            cache_strategy: CacheStrategy::default(),
        }
    }
}

impl SettingsConfig {
    /// Create a new builder for `SettingsConfig`
    ///
    /// # Example
    /// ```rust
    /// use simple_settings::SettingsConfig;
    /// use std::time::Duration;
    ///
    /// let config = SettingsConfig::builder()
    ///     .cache_timeout(Duration::from_secs(300))
    ///     .cache_key_namespace("myapp:")
    ///     .build();
    /// assert_eq!(config.cache_key("theme"), "myapp:theme");
    /// ```
    pub fn builder() -> SettingsConfigBuilder {
        SettingsConfigBuilder::new()
    }

    /// Defaults overridden by `SIMPLE_SETTINGS_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the timeout is not a whole number of seconds.
    pub fn from_env(source: &dyn EnvSource) -> Result<Self> {
        let mut builder = SettingsConfigBuilder::new();

        if let Some(raw) = source.var(ENV_CACHE_TIMEOUT) {
            let seconds = raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("{ENV_CACHE_TIMEOUT}='{raw}' is not a number of seconds: {e}"))
            })?;
            builder = builder.cache_timeout(Duration::from_secs(seconds));
        }
        if let Some(alias) = source.var(ENV_CACHE_ALIAS) {
            builder = builder.cache_alias(alias);
        }
        if let Some(namespace) = source.var(ENV_CACHE_KEY) {
            builder = builder.cache_key_namespace(namespace);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that can never work
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty alias or an invalid cache strategy.
    pub fn validate(&self) -> Result<()> {
        if self.cache_alias.is_empty() {
            return Err(Error::Config("Cache alias must not be empty".into()));
        }
        self.cache_strategy.validate()
    }

    /// Cache key for a setting
    pub fn cache_key(&self, key: &str) -> String {
        format!("{}{key}", self.cache_key_namespace)
    }

    /// Cache key of the bulk "all settings" marker
    pub fn all_settings_key(&self) -> String {
        self.cache_key(ALL_MARKER)
    }
}

/// Builder for creating `SettingsConfig` with a fluent API
#[derive(Debug, Clone, Default)]
pub struct SettingsConfigBuilder {
    config: SettingsConfig,
}

impl SettingsConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lifetime of cached values (default: 24h)
    pub fn cache_timeout(mut self, timeout: Duration) -> Self {
        self.config.cache_timeout = timeout;
        self
    }

    /// Select a registered cache backend (default: "default")
    pub fn cache_alias(mut self, alias: impl Into<String>) -> Self {
        self.config.cache_alias = alias.into();
        self
    }

    /// Set the cache key prefix (default: "simple_settings:")
    pub fn cache_key_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.cache_key_namespace = namespace.into();
        self
    }

    /// Strategy for the cache built when the alias is not registered
    pub fn cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.config.cache_strategy = strategy;
        self
    }

    /// Build the `SettingsConfig`
    pub fn build(self) -> SettingsConfig {
        self.config
    }
}
