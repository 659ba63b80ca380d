//! Role configuration: endpoint patterns and UI route prefixes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleConfigError {
    #[error("malformed endpoint pattern '{pattern}': {reason}")]
    MalformedPattern { pattern: String, reason: String },

    #[error("role '{0}' is already registered")]
    Duplicate(String),

    #[error("role name cannot be empty")]
    EmptyName,
}

fn malformed(pattern: &str, reason: impl Into<String>) -> RoleConfigError {
    RoleConfigError::MalformedPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

/// Endpoint path pattern, e.g. `/api/employee/{id}`.
///
/// Each `{identifier}` placeholder matches exactly one non-empty path segment
/// (no `/`). The pattern is anchored at both ends, so `/api/employee/{id}`
/// matches `/api/employee/123` but not `/api/employee/123/extra`.
///
/// Patterns are compiled on construction; a malformed pattern can never reach
/// a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointPattern {
    raw: String,
    regex: Regex,
}

impl EndpointPattern {
    pub fn parse(raw: impl Into<String>) -> Result<Self, RoleConfigError> {
        let raw = raw.into();
        let regex = compile(&raw)?;
        Ok(Self { raw, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Test a full endpoint path against this pattern.
    pub fn matches(&self, endpoint: &str) -> bool {
        self.regex.is_match(endpoint)
    }
}

impl PartialEq for EndpointPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for EndpointPattern {}

impl TryFrom<String> for EndpointPattern {
    type Error = RoleConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EndpointPattern> for String {
    fn from(value: EndpointPattern) -> Self {
        value.raw
    }
}

impl core::fmt::Display for EndpointPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn compile(raw: &str) -> Result<Regex, RoleConfigError> {
    let mut out = String::with_capacity(raw.len() + 16);
    out.push('^');

    let mut rest = raw;
    while let Some(idx) = rest.find(['{', '}']) {
        let (literal, tail) = rest.split_at(idx);
        if tail.starts_with('}') {
            return Err(malformed(raw, "unmatched '}'"));
        }
        out.push_str(&regex::escape(literal));

        let close = tail
            .find('}')
            .ok_or_else(|| malformed(raw, "unclosed '{'"))?;
        let name = &tail[1..close];
        if !is_identifier(name) {
            return Err(malformed(
                raw,
                format!("placeholder '{{{name}}}' is not an identifier"),
            ));
        }
        out.push_str("[^/]+");
        rest = &tail[close + 1..];
    }
    out.push_str(&regex::escape(rest));
    out.push('$');

    Regex::new(&out).map_err(|e| malformed(raw, e.to_string()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// What a role may reach: backend endpoints and UI routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    /// Tried in order until one matches.
    pub endpoints: Vec<EndpointPattern>,
    /// Route prefixes.
    pub ui_routes: Vec<String>,
}

impl RolePermissions {
    pub fn new<E, R>(endpoints: E, ui_routes: R) -> Result<Self, RoleConfigError>
    where
        E: IntoIterator,
        E::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Ok(Self {
            endpoints: parse_patterns(endpoints)?,
            ui_routes: ui_routes.into_iter().map(Into::into).collect(),
        })
    }
}

pub(crate) fn parse_patterns<E>(endpoints: E) -> Result<Vec<EndpointPattern>, RoleConfigError>
where
    E: IntoIterator,
    E::Item: Into<String>,
{
    endpoints.into_iter().map(EndpointPattern::parse).collect()
}

/// A role as registered in the permission table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfig {
    pub name: Role,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Entry path for this role after authentication.
    pub panel_route: String,
    pub permissions: RolePermissions,
}

impl RoleConfig {
    pub fn new(
        name: impl Into<Role>,
        display_name: impl Into<String>,
        panel_route: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            panel_route: panel_route.into(),
            permissions: RolePermissions::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_permissions(mut self, permissions: RolePermissions) -> Self {
        self.permissions = permissions;
        self
    }
}

/// Partial update for a registered role. `None` leaves a field untouched.
///
/// Endpoint patterns are carried raw and validated when the patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfigPatch {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub panel_route: Option<String>,
    pub endpoints: Option<Vec<String>>,
    pub ui_routes: Option<Vec<String>>,
}
