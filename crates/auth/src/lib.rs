//! `velithra-auth`: role permission table and session state.
//!
//! This crate is intentionally decoupled from HTTP. Every check here is
//! advisory: the backend remains the authority.

pub mod authorize;
pub mod context;
pub mod permissions;
pub mod registry;
pub mod roles;
pub mod session;

pub use authorize::{authorize_endpoint, authorize_route, explain_route, AccessDenied, RouteExplanation};
pub use context::AuthContext;
pub use permissions::{EndpointPattern, RoleConfig, RoleConfigError, RoleConfigPatch, RolePermissions};
pub use registry::{ParseRouteMatchingError, RoleRegistry, RouteMatching};
pub use roles::Role;
pub use session::{Session, SessionState, SessionStore, AUTH_STORAGE_KEY};
