//! Mapping of the backend's module-status payload onto [`ModuleConfig`].
//!
//! The backend reports `{code, name, isActive, ...}` only; navigation metadata
//! comes from the static [`ModuleRegistry`]. Codes the registry does not know
//! get conservative defaults (Admin-only, sorted last).

use serde::{Deserialize, Serialize};

use velithra_auth::Role;

use crate::definition::{ModuleCode, ModuleConfig, ModuleDefinition};
use crate::registry::ModuleRegistry;

pub const DEFAULT_MODULE_PATH: &str = "/dashboard";
pub const DEFAULT_MODULE_ICON: &str = "box";
pub const DEFAULT_MODULE_ORDER: i32 = 999;

/// One entry of the backend's module-status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendModule {
    pub code: ModuleCode,
    pub name: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BackendModule {
    pub fn into_module_config(self, registry: &ModuleRegistry) -> ModuleConfig {
        let definition = match registry.get(self.code.as_str()) {
            Some(known) => ModuleDefinition {
                code: self.code,
                name: self.name,
                ..known.clone()
            },
            None => {
                tracing::debug!(code = %self.code, "backend reported a module without static metadata");
                ModuleDefinition::new(
                    self.code,
                    self.name,
                    DEFAULT_MODULE_PATH,
                    DEFAULT_MODULE_ICON,
                    [Role::ADMIN],
                    DEFAULT_MODULE_ORDER,
                )
            }
        };
        ModuleConfig::new(definition, self.is_active)
    }
}

/// Map a whole backend list, preserving its order.
pub fn map_backend_modules(modules: Vec<BackendModule>, registry: &ModuleRegistry) -> Vec<ModuleConfig> {
    modules
        .into_iter()
        .map(|m| m.into_module_config(registry))
        .collect()
}

/// The module-status response, either bare or wrapped in `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModuleStatusPayload {
    Wrapped { data: Vec<BackendModule> },
    Bare(Vec<BackendModule>),
}

impl ModuleStatusPayload {
    pub fn into_modules(self) -> Vec<BackendModule> {
        match self {
            ModuleStatusPayload::Wrapped { data } => data,
            ModuleStatusPayload::Bare(modules) => modules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code_joins_static_metadata() {
        let registry = ModuleRegistry::with_defaults();
        let backend = BackendModule {
            code: ModuleCode::from("HR"),
            name: "People Ops".to_string(),
            is_active: true,
            description: None,
        };

        let config = backend.into_module_config(&registry);

        assert_eq!(config.definition.name, "People Ops");
        assert_eq!(config.definition.path, "/hr");
        assert_eq!(config.definition.roles, vec![Role::ADMIN, Role::HR]);
        assert_eq!(config.definition.order, 6);
        assert_eq!(config.definition.category.as_deref(), Some("hr"));
        assert!(config.is_active);
    }

    #[test]
    fn unknown_code_gets_defaults() {
        let registry = ModuleRegistry::with_defaults();
        let backend = BackendModule {
            code: ModuleCode::from("PAYROLL"),
            name: "Payroll".to_string(),
            is_active: false,
            description: Some("beta".to_string()),
        };

        let config = backend.into_module_config(&registry);

        assert_eq!(config.definition.path, DEFAULT_MODULE_PATH);
        assert_eq!(config.definition.icon, DEFAULT_MODULE_ICON);
        assert_eq!(config.definition.roles, vec![Role::ADMIN]);
        assert_eq!(config.definition.order, DEFAULT_MODULE_ORDER);
        assert_eq!(config.definition.category, None);
        assert!(!config.is_active);
    }

    #[test]
    fn payload_accepts_bare_and_wrapped_lists() {
        let bare = r#"[{"code":"HR","name":"HR","isActive":true}]"#;
        let wrapped = r#"{"data":[{"code":"HR","name":"HR","isActive":true}],"success":true}"#;

        for raw in [bare, wrapped] {
            let payload: ModuleStatusPayload = serde_json::from_str(raw).unwrap();
            let modules = payload.into_modules();
            assert_eq!(modules.len(), 1);
            assert_eq!(modules[0].code.as_str(), "HR");
        }
    }

    #[test]
    fn mapping_preserves_backend_order() {
        let registry = ModuleRegistry::with_defaults();
        let list = vec![
            BackendModule {
                code: ModuleCode::from("CHAT"),
                name: "Chat".to_string(),
                is_active: true,
                description: None,
            },
            BackendModule {
                code: ModuleCode::from("USERS"),
                name: "Users".to_string(),
                is_active: true,
                description: None,
            },
        ];

        let configs = map_backend_modules(list, &registry);

        let codes: Vec<&str> = configs.iter().map(|c| c.code().as_str()).collect();
        assert_eq!(codes, vec!["CHAT", "USERS"]);
    }
}
