//! Role Permission Table.
//!
//! A process-wide, mutable table of [`RoleConfig`]s. It is an explicit object
//! owned by the composition root (not a global), so tests build isolated
//! copies. Every operation takes the lock for its whole duration; nothing is
//! atomic across calls.

use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::permissions::{parse_patterns, RoleConfig, RoleConfigError, RoleConfigPatch, RolePermissions};
use crate::Role;

/// How a UI route prefix is compared against a route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteMatching {
    /// Prefix must end at a path-segment boundary: `/audit` matches `/audit`
    /// and `/audit/logs` but not `/audit-logs`. A prefix that already ends in
    /// `/` matches anything beneath it.
    #[default]
    Segment,
    /// Plain string prefix (`/audit` also matches `/audit-logs`).
    Raw,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown route matching '{0}' (expected 'segment' or 'raw')")]
pub struct ParseRouteMatchingError(String);

impl FromStr for RouteMatching {
    type Err = ParseRouteMatchingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "segment" => Ok(RouteMatching::Segment),
            "raw" => Ok(RouteMatching::Raw),
            _ => Err(ParseRouteMatchingError(s.to_string())),
        }
    }
}

impl fmt::Display for RouteMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteMatching::Segment => "segment",
            RouteMatching::Raw => "raw",
        })
    }
}

impl RouteMatching {
    pub fn matches(self, prefix: &str, route: &str) -> bool {
        if prefix.is_empty() || !route.starts_with(prefix) {
            return false;
        }
        match self {
            RouteMatching::Raw => true,
            RouteMatching::Segment => {
                prefix.ends_with('/')
                    || matches!(
                        route.as_bytes().get(prefix.len()),
                        None | Some(b'/') | Some(b'?') | Some(b'#')
                    )
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RoleRegistry {
    roles: RwLock<Vec<RoleConfig>>,
    matching: RouteMatching,
}

impl RoleRegistry {
    /// Empty registry with segment-boundary route matching.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route_matching(matching: RouteMatching) -> Self {
        Self {
            roles: RwLock::new(Vec::new()),
            matching,
        }
    }

    /// Registry pre-populated with the built-in Velithra roles.
    pub fn with_defaults() -> Self {
        Self::with_defaults_matching(RouteMatching::default())
    }

    pub fn with_defaults_matching(matching: RouteMatching) -> Self {
        let registry = Self::with_route_matching(matching);
        for config in default_roles() {
            match config.and_then(|c| registry.add_role(c)) {
                Ok(()) => {}
                Err(err) => tracing::error!(error = %err, "failed to register built-in role"),
            }
        }
        registry
    }

    pub fn route_matching(&self) -> RouteMatching {
        self.matching
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<RoleConfig>> {
        self.roles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<RoleConfig>> {
        self.roles.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_role_config(&self, name: &str) -> Option<RoleConfig> {
        self.read().iter().find(|c| c.name.as_str() == name).cloned()
    }

    /// All registered roles, in registration order.
    pub fn roles(&self) -> Vec<RoleConfig> {
        self.read().clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().iter().any(|c| c.name.as_str() == name)
    }

    /// Whether `role` may call `endpoint`.
    ///
    /// Advisory only: the backend is the enforcement point. Unknown roles are
    /// denied.
    pub fn can_access_endpoint(&self, role: &str, endpoint: &str) -> bool {
        let roles = self.read();
        let Some(config) = roles.iter().find(|c| c.name.as_str() == role) else {
            tracing::debug!(role, endpoint, "endpoint check for unknown role");
            return false;
        };
        config
            .permissions
            .endpoints
            .iter()
            .any(|pattern| pattern.matches(endpoint))
    }

    /// Whether `route` falls under one of the role's UI route prefixes.
    pub fn can_access_route(&self, role: &str, route: &str) -> bool {
        let roles = self.read();
        let Some(config) = roles.iter().find(|c| c.name.as_str() == role) else {
            tracing::debug!(role, route, "route check for unknown role");
            return false;
        };
        config
            .permissions
            .ui_routes
            .iter()
            .any(|prefix| self.matching.matches(prefix, route))
    }

    /// Panel route of the first held role that has a registered config.
    pub fn panel_route_for(&self, held: &[Role]) -> Option<String> {
        let roles = self.read();
        held.iter().find_map(|role| {
            roles
                .iter()
                .find(|c| &c.name == role)
                .map(|c| c.panel_route.clone())
        })
    }

    pub fn add_role(&self, config: RoleConfig) -> Result<(), RoleConfigError> {
        if config.name.as_str().trim().is_empty() {
            return Err(RoleConfigError::EmptyName);
        }

        let mut roles = self.write();
        if roles.iter().any(|c| c.name == config.name) {
            return Err(RoleConfigError::Duplicate(config.name.to_string()));
        }

        tracing::info!(role = %config.name, "role registered");
        roles.push(config);
        Ok(())
    }

    /// Apply a partial update. `Ok(false)` if the role is not registered.
    ///
    /// Endpoint patterns in the patch are validated before anything changes.
    pub fn update_role(&self, name: &str, patch: RoleConfigPatch) -> Result<bool, RoleConfigError> {
        let endpoints = patch.endpoints.map(parse_patterns).transpose()?;

        let mut roles = self.write();
        let Some(config) = roles.iter_mut().find(|c| c.name.as_str() == name) else {
            return Ok(false);
        };

        if let Some(display_name) = patch.display_name {
            config.display_name = display_name;
        }
        if let Some(description) = patch.description {
            config.description = description;
        }
        if let Some(panel_route) = patch.panel_route {
            config.panel_route = panel_route;
        }
        if let Some(endpoints) = endpoints {
            config.permissions.endpoints = endpoints;
        }
        if let Some(ui_routes) = patch.ui_routes {
            config.permissions.ui_routes = ui_routes;
        }

        tracing::info!(role = name, "role updated");
        Ok(true)
    }

    pub fn remove_role(&self, name: &str) -> bool {
        let mut roles = self.write();
        let before = roles.len();
        roles.retain(|c| c.name.as_str() != name);
        let removed = roles.len() != before;
        if removed {
            tracing::info!(role = name, "role removed");
        }
        removed
    }
}

fn role(
    name: Role,
    display_name: &str,
    description: &str,
    panel_route: &str,
    endpoints: &[&str],
    ui_routes: &[&str],
) -> Result<RoleConfig, RoleConfigError> {
    Ok(RoleConfig::new(name, display_name, panel_route)
        .with_description(description)
        .with_permissions(RolePermissions::new(
            endpoints.iter().copied(),
            ui_routes.iter().copied(),
        )?))
}

fn default_roles() -> Vec<Result<RoleConfig, RoleConfigError>> {
    vec![
        role(
            Role::ADMIN,
            "Administrator",
            "Full access to users, roles, organisation data and system settings",
            "/dashboard",
            &[
                "/api/auth/me",
                "/api/modules",
                "/api/modules/{code}",
                "/api/user",
                "/api/user/{id}",
                "/api/role",
                "/api/role/{id}",
                "/api/employee",
                "/api/employee/{id}",
                "/api/department",
                "/api/department/{id}",
                "/api/position",
                "/api/position/{id}",
                "/api/course",
                "/api/course/{id}",
                "/api/task",
                "/api/task/{id}",
                "/api/notification",
                "/api/notification/{id}",
                "/api/chat",
                "/api/chat/{id}",
                "/api/auditlog",
                "/api/auditlog/{id}",
            ],
            &[
                "/dashboard",
                "/admin",
                "/home",
                "/employees",
                "/departments",
                "/positions",
                "/hr",
                "/courses",
                "/tasks",
                "/notifications",
                "/chat",
            ],
        ),
        role(
            Role::MANAGER,
            "Manager",
            "Team oversight: employees, tasks and course assignments",
            "/manager",
            &[
                "/api/auth/me",
                "/api/modules",
                "/api/employee",
                "/api/employee/{id}",
                "/api/department",
                "/api/department/{id}",
                "/api/task",
                "/api/task/{id}",
                "/api/course",
                "/api/course/{id}",
                "/api/notification/my",
                "/api/chat",
                "/api/chat/{id}",
            ],
            &[
                "/manager",
                "/home",
                "/employees",
                "/departments",
                "/courses",
                "/tasks",
                "/notifications",
                "/chat",
            ],
        ),
        role(
            Role::HR,
            "Human Resources",
            "Employee records, departments, positions and training",
            "/hr",
            &[
                "/api/auth/me",
                "/api/modules",
                "/api/employee",
                "/api/employee/{id}",
                "/api/department",
                "/api/department/{id}",
                "/api/position",
                "/api/position/{id}",
                "/api/course",
                "/api/course/{id}",
                "/api/notification",
                "/api/notification/my",
                "/api/chat",
                "/api/chat/{id}",
            ],
            &[
                "/hr",
                "/home",
                "/departments",
                "/positions",
                "/courses",
                "/notifications",
                "/chat",
            ],
        ),
        role(
            Role::EMPLOYEE,
            "Employee",
            "Own tasks, enrolled courses and notifications",
            "/employee",
            &[
                "/api/auth/me",
                "/api/modules",
                "/api/task/my",
                "/api/task/{id}",
                "/api/course/my",
                "/api/course/{id}",
                "/api/notification/my",
                "/api/chat",
                "/api/chat/{id}",
            ],
            &[
                "/employee",
                "/home",
                "/courses",
                "/tasks",
                "/notifications",
                "/chat",
            ],
        ),
        role(
            Role::USER,
            "User",
            "Basic account with profile and notifications",
            "/user",
            &[
                "/api/auth/me",
                "/api/modules",
                "/api/notification/my",
                "/api/chat",
            ],
            &["/user", "/home", "/notifications", "/chat"],
        ),
    ]
}
