//! Error types for simple-settings

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for simple-settings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for simple-settings
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported value type: {type_name} (expected bool, float, int or str)")]
    UnsupportedType { type_name: String },

    #[error("Invalid value for {key}: {reason}")]
    Validation { key: String, reason: String },

    #[error("Cannot decode '{raw}' as {value_type}: {reason}")]
    InvalidValue {
        value_type: String,
        raw: String,
        reason: String,
    },

    #[error("Type mismatch for {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Setting not found: {0}")]
    KeyNotFound(String),

    #[error("No stored setting or static default named '{0}'")]
    AttributeNotFound(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Cache Errors
    // -------------------------------------------------------------------------
    #[error("No cache registered under alias '{0}'")]
    CacheAliasNotFound(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::KeyNotFound(_) | Error::AttributeNotFound(_) | Error::CacheAliasNotFound(_)
        )
    }

    /// Check if this error rejected a value before it reached the store
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::UnsupportedType { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        assert!(Error::KeyNotFound("a".into()).is_not_found());
        assert!(Error::AttributeNotFound("a".into()).is_not_found());
        assert!(!Error::Config("bad".into()).is_not_found());
    }

    #[test]
    fn test_validation_predicate() {
        let err = Error::Validation {
            key: "port".into(),
            reason: "Incorrect integer value".into(),
        };
        assert!(err.is_validation_error());
        assert_eq!(err.to_string(), "Invalid value for port: Incorrect integer value");

        let err = Error::UnsupportedType {
            type_name: "array".into(),
        };
        assert!(err.is_validation_error());
        assert!(!Error::Cache("down".into()).is_validation_error());
    }
}
