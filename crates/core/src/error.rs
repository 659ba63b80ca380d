//! Storage error model.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used by the storage layer.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure while reading or writing persisted client state.
///
/// Stores treat these as non-fatal: in-memory state stays authoritative and the
/// failure is logged.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure at a concrete location.
    #[error("storage io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted payload could not be encoded or decoded.
    #[error("failed to (de)serialize persisted state for '{key}': {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Keys are file names for the file backend, so they are restricted.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// No usable application data directory could be resolved.
    #[error("failed to resolve an application data directory")]
    NoDataDir,
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn serde(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serde {
            key: key.into(),
            source,
        }
    }
}
