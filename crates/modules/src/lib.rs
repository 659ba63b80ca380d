//! `velithra-modules`: module catalogue and backend-reported availability.
//!
//! The registry is static navigation metadata; the store is the persisted,
//! TTL-cached record of which modules the backend currently has enabled.

pub mod backend;
pub mod definition;
pub mod registry;
pub mod store;

pub use backend::{map_backend_modules, BackendModule, ModuleStatusPayload};
pub use definition::{ModuleCode, ModuleConfig, ModuleDefinition};
pub use registry::{ModuleRegistry, ModuleRegistryError};
pub use store::{
    default_module_ttl, FetchTicket, ModuleSnapshot, ModuleStore, DEFAULT_MODULE_TTL_MS, MODULES_STORAGE_KEY,
};
