//! `velithra-client`: backend API client, module refresh and the composition root.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod sync;

pub use api::{ApiClient, ApiError, AuthResponse, LoginRequest, RegisterRequest};
pub use app::AppState;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_MODULE_TTL_SECS};
pub use error::{ClientError, ConfigError};
pub use sync::{ModuleSync, RefreshOutcome, SyncError};
