//! Explicit storage configuration passed in by the caller at start-up.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the task store keeps its SQLite database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum StorageLocation {
    /// Durable database file.
    File(PathBuf),
    /// Private in-memory database, discarded when the connection closes.
    InMemory,
}

impl StorageLocation {
    /// Short label used in log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::InMemory => "memory",
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub location: StorageLocation,
}

impl StoreConfig {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: StorageLocation::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StorageLocation::InMemory,
        }
    }
}
