//! Storage format trait and implementations used by [`FileStore`](crate::store::FileStore)

use crate::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Trait for on-disk document formats
///
/// A [`FileStore`](crate::store::FileStore) only sees documents, so the
/// on-disk encoding can change without touching the store.
pub trait StorageBackend: Clone + Send + Sync {
    /// Extension of files in this format, without the dot
    fn extension(&self) -> &str;

    /// Encode a document as text
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Decode a document from text
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and deserialize a file, or `None` if it does not exist yet
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        self.deserialize(&content).map(Some)
    }

    /// Encode `data` and replace the file at `path` with it
    ///
    /// Writes to a sibling `.tmp` file and renames it over the target, so a
    /// crash never leaves a half-written settings file. The file is readable
    /// by its owner only.
    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                ensure_secure_dir(parent)?;
            }
        }

        let file_name = path.file_name().ok_or_else(|| {
            Error::Config(format!(
                "Invalid path '{}': must have a filename",
                path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = path.with_file_name(temp_filename);

        std::fs::write(&temp_path, &content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;
        set_owner_only(&temp_path, 0o600)?;

        std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// =============================================================================
// JSON Storage Implementation
// =============================================================================

/// Settings documents as JSON, the default format of [`FileStore`](crate::store::FileStore)
#[derive(Debug, Clone)]
pub struct JsonStorage {
    /// Indent output for hand editing
    pretty: bool,
}

impl JsonStorage {
    /// Indented JSON
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line JSON
    #[must_use]
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for JsonStorage {
    fn extension(&self) -> &str {
        "json"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

// =============================================================================
// Permissions
// =============================================================================

/// Create a directory (and parents) readable by its owner only
pub(crate) fn ensure_secure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })?;
    set_owner_only(path, 0o700)
}

#[cfg(unix)]
fn set_owner_only(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
        Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Mode bits only exist on unix targets
#[cfg(not(unix))]
fn set_owner_only(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
