use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are opaque, case-sensitive strings as issued by the backend
/// (`"Admin"`, `"HR"`, ...). Mapping a role to what it may reach is the job of
/// the [`RoleRegistry`](crate::RoleRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("Admin"));
    pub const MANAGER: Role = Role(Cow::Borrowed("Manager"));
    pub const HR: Role = Role(Cow::Borrowed("HR"));
    pub const EMPLOYEE: Role = Role(Cow::Borrowed("Employee"));
    pub const USER: Role = Role(Cow::Borrowed("User"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Deduplicate roles while keeping first-seen order.
///
/// Order matters: the first held role with a registered config decides the
/// landing route after authentication.
pub fn dedup_roles(roles: impl IntoIterator<Item = Role>) -> Vec<Role> {
    let mut out: Vec<Role> = Vec::new();
    for role in roles {
        if !out.contains(&role) {
            out.push(role);
        }
    }
    out
}

/// True if the two role lists share at least one role.
pub fn roles_overlap(held: &[Role], required: &[Role]) -> bool {
    held.iter().any(|r| required.contains(r))
}
