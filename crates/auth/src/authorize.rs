//! Any-of authorization over a user's held roles.
//!
//! These checks are advisory. They let the client fail fast and hide what a
//! user cannot use; they are never the barrier in front of a sensitive
//! operation. The backend re-checks every request.

use serde::Serialize;
use thiserror::Error;

use crate::{Role, RoleRegistry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: no held role grants endpoint '{0}'")]
    Endpoint(String),

    #[error("forbidden: no held role grants route '{0}'")]
    Route(String),
}

/// Grant `endpoint` if **any** held role grants it.
pub fn authorize_endpoint(
    registry: &RoleRegistry,
    held: &[Role],
    endpoint: &str,
) -> Result<(), AccessDenied> {
    if held
        .iter()
        .any(|role| registry.can_access_endpoint(role.as_str(), endpoint))
    {
        Ok(())
    } else {
        Err(AccessDenied::Endpoint(endpoint.to_string()))
    }
}

/// Grant `route` if **any** held role grants it.
pub fn authorize_route(registry: &RoleRegistry, held: &[Role], route: &str) -> Result<(), AccessDenied> {
    if held
        .iter()
        .any(|role| registry.can_access_route(role.as_str(), route))
    {
        Ok(())
    } else {
        Err(AccessDenied::Route(route.to_string()))
    }
}

/// Which held roles grant a route, for display and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteExplanation {
    pub route: String,
    pub granted: bool,
    pub granting_roles: Vec<String>,
    pub unknown_roles: Vec<String>,
}

pub fn explain_route(registry: &RoleRegistry, held: &[Role], route: &str) -> RouteExplanation {
    let mut granting_roles = Vec::new();
    let mut unknown_roles = Vec::new();

    for role in held {
        if !registry.contains(role.as_str()) {
            unknown_roles.push(role.to_string());
        } else if registry.can_access_route(role.as_str(), route) {
            granting_roles.push(role.to_string());
        }
    }

    RouteExplanation {
        route: route.to_string(),
        granted: !granting_roles.is_empty(),
        granting_roles,
        unknown_roles,
    }
}
