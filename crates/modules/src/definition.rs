//! Module metadata: static definitions and backend-reported configs.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use velithra_auth::Role;

/// Unique module key, e.g. `"HR"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCode(Cow<'static, str>);

impl ModuleCode {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ModuleCode {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModuleCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Navigation entry for a feature area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    pub code: ModuleCode,
    pub name: String,
    pub path: String,
    pub icon: String,
    /// Roles permitted to see the module (any-of).
    pub roles: Vec<Role>,
    /// Ascending sort key; ties keep registry order.
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ModuleDefinition {
    pub fn new(
        code: impl Into<ModuleCode>,
        name: impl Into<String>,
        path: impl Into<String>,
        icon: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
        order: i32,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            path: path.into(),
            icon: icon.into(),
            roles: roles.into_iter().collect(),
            order,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// At least one held role is among the module's roles.
    pub fn allows_any(&self, held: &[Role]) -> bool {
        self.roles.iter().any(|r| held.contains(r))
    }
}

/// A module as reported by the backend: definition plus tenant-wide status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    #[serde(flatten)]
    pub definition: ModuleDefinition,
    pub is_active: bool,
}

impl ModuleConfig {
    pub fn new(definition: ModuleDefinition, is_active: bool) -> Self {
        Self {
            definition,
            is_active,
        }
    }

    pub fn code(&self) -> &ModuleCode {
        &self.definition.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_config_serializes_flat() {
        let config = ModuleConfig::new(
            ModuleDefinition::new("HR", "Human Resources", "/hr", "users", [Role::HR], 3)
                .with_category("hr"),
            true,
        );

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["code"], "HR");
        assert_eq!(value["isActive"], true);
        assert_eq!(value["category"], "hr");
        assert_eq!(value["roles"][0], "HR");

        let back: ModuleConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn allows_any_requires_overlap() {
        let def = ModuleDefinition::new(
            "EMPLOYEES",
            "Employees",
            "/employees",
            "id-card",
            [Role::ADMIN, Role::MANAGER],
            4,
        );

        assert!(def.allows_any(&[Role::HR, Role::MANAGER]));
        assert!(!def.allows_any(&[Role::HR]));
        assert!(!def.allows_any(&[]));
    }
}
