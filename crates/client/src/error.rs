use thiserror::Error;

use velithra_auth::AccessDenied;
use velithra_core::StorageError;

use crate::api::ApiError;
use crate::sync::SyncError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("module TTL must be between 1 second and i64::MAX seconds, got {0}")]
    InvalidTtl(u64),

    #[error("cannot resolve data directory: {0}")]
    DataDir(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("local storage: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Denied(#[from] AccessDenied),
}
