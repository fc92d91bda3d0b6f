//! Environment variable sources
//!
//! Configuration reads variables through [`EnvSource`] so tests can inject a
//! fixed map instead of touching the process environment.

use std::collections::HashMap;

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    /// Value of `name`, or `None` if unset or not valid unicode
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed set of variables
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
