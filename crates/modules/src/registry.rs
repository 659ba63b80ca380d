//! Module Registry: the static catalogue of feature areas.
//!
//! Read-only once built. Visibility = role overlap AND tenant-wide active
//! status; results are stably sorted by `order`.

use thiserror::Error;

use velithra_auth::Role;

use crate::definition::{ModuleCode, ModuleDefinition};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModuleRegistryError {
    #[error("module code '{0}' is registered more than once")]
    Duplicate(String),
}

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    definitions: Vec<ModuleDefinition>,
}

impl ModuleRegistry {
    pub fn new(definitions: Vec<ModuleDefinition>) -> Result<Self, ModuleRegistryError> {
        for (idx, def) in definitions.iter().enumerate() {
            if definitions[..idx].iter().any(|d| d.code == def.code) {
                return Err(ModuleRegistryError::Duplicate(def.code.to_string()));
            }
        }
        Ok(Self { definitions })
    }

    /// The built-in Velithra module catalogue.
    pub fn with_defaults() -> Self {
        Self {
            definitions: default_modules(),
        }
    }

    pub fn definitions(&self) -> &[ModuleDefinition] {
        &self.definitions
    }

    pub fn get(&self, code: &str) -> Option<&ModuleDefinition> {
        self.definitions.iter().find(|d| d.code.as_str() == code)
    }

    pub fn get_visible_modules(
        &self,
        user_roles: &[Role],
        active_codes: &[ModuleCode],
    ) -> Vec<ModuleDefinition> {
        self.visible(user_roles, active_codes, |_| true)
    }

    pub fn get_modules_by_category(
        &self,
        category: &str,
        user_roles: &[Role],
        active_codes: &[ModuleCode],
    ) -> Vec<ModuleDefinition> {
        self.visible(user_roles, active_codes, |d| {
            d.category.as_deref() == Some(category)
        })
    }

    /// Unknown codes are denied.
    pub fn has_module_access(
        &self,
        code: &str,
        user_roles: &[Role],
        active_codes: &[ModuleCode],
    ) -> bool {
        self.get(code)
            .is_some_and(|d| is_visible(d, user_roles, active_codes))
    }

    fn visible<F>(&self, user_roles: &[Role], active_codes: &[ModuleCode], extra: F) -> Vec<ModuleDefinition>
    where
        F: Fn(&ModuleDefinition) -> bool,
    {
        let mut modules: Vec<ModuleDefinition> = self
            .definitions
            .iter()
            .filter(|d| is_visible(d, user_roles, active_codes) && extra(d))
            .cloned()
            .collect();
        // `sort_by_key` is stable: equal orders keep registry order.
        modules.sort_by_key(|d| d.order);
        modules
    }
}

fn is_visible(def: &ModuleDefinition, user_roles: &[Role], active_codes: &[ModuleCode]) -> bool {
    def.allows_any(user_roles) && active_codes.contains(&def.code)
}

fn default_modules() -> Vec<ModuleDefinition> {
    use Role as R;

    let everyone = [R::ADMIN, R::MANAGER, R::HR, R::EMPLOYEE, R::USER];

    vec![
        ModuleDefinition::new("DASHBOARD", "Dashboard", "/home", "layout-dashboard", everyone.clone(), 0)
            .with_category("general"),
        ModuleDefinition::new("USERS", "Users", "/dashboard/users", "users", [R::ADMIN], 1)
            .with_category("administration"),
        ModuleDefinition::new("ROLES", "Roles", "/dashboard/roles", "shield", [R::ADMIN], 2)
            .with_category("administration"),
        ModuleDefinition::new(
            "EMPLOYEES",
            "Employees",
            "/employees",
            "id-card",
            [R::ADMIN, R::MANAGER],
            3,
        )
        .with_category("organization"),
        ModuleDefinition::new(
            "DEPARTMENTS",
            "Departments",
            "/departments",
            "building",
            [R::ADMIN, R::MANAGER, R::HR],
            4,
        )
        .with_category("organization"),
        ModuleDefinition::new(
            "POSITIONS",
            "Positions",
            "/positions",
            "briefcase",
            [R::ADMIN, R::HR],
            5,
        )
        .with_category("organization"),
        ModuleDefinition::new("HR", "Human Resources", "/hr", "user-check", [R::ADMIN, R::HR], 6)
            .with_category("hr"),
        ModuleDefinition::new(
            "COURSES",
            "Courses",
            "/courses",
            "graduation-cap",
            [R::ADMIN, R::MANAGER, R::HR, R::EMPLOYEE],
            7,
        )
        .with_category("learning"),
        ModuleDefinition::new(
            "TASKS",
            "Tasks",
            "/tasks",
            "check-square",
            [R::ADMIN, R::MANAGER, R::EMPLOYEE],
            8,
        )
        .with_category("productivity"),
        ModuleDefinition::new("NOTIFICATIONS", "Notifications", "/notifications", "bell", everyone.clone(), 9)
            .with_category("communication"),
        ModuleDefinition::new("CHAT", "Chat", "/chat", "message-square", everyone, 10)
            .with_category("communication"),
        ModuleDefinition::new("AUDIT_LOGS", "Audit Logs", "/dashboard/audit-logs", "file-text", [R::ADMIN], 11)
            .with_category("system"),
        ModuleDefinition::new("MODULES", "Modules", "/dashboard/modules", "settings", [R::ADMIN], 12)
            .with_category("system"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codes(mods: &[ModuleDefinition]) -> Vec<&str> {
        mods.iter().map(|m| m.code.as_str()).collect()
    }

    fn all_active(registry: &ModuleRegistry) -> Vec<ModuleCode> {
        registry.definitions().iter().map(|d| d.code.clone()).collect()
    }

    #[test]
    fn defaults_have_unique_codes() {
        let defaults = ModuleRegistry::with_defaults();
        assert!(ModuleRegistry::new(defaults.definitions().to_vec()).is_ok());
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let def = ModuleDefinition::new("HR", "HR", "/hr", "users", [Role::HR], 1);
        let err = ModuleRegistry::new(vec![def.clone(), def]).unwrap_err();
        assert_eq!(err, ModuleRegistryError::Duplicate("HR".to_string()));
    }

    #[test]
    fn hr_user_never_sees_employees_module() {
        let registry = ModuleRegistry::with_defaults();
        let active = all_active(&registry);

        let visible = registry.get_visible_modules(&[Role::HR], &active);

        assert!(!codes(&visible).contains(&"EMPLOYEES"));
        assert!(codes(&visible).contains(&"HR"));
        assert!(!registry.has_module_access("EMPLOYEES", &[Role::HR], &active));
    }

    #[test]
    fn inactive_modules_are_hidden() {
        let registry = ModuleRegistry::with_defaults();
        let active = vec![ModuleCode::from("DASHBOARD"), ModuleCode::from("CHAT")];

        let visible = registry.get_visible_modules(&[Role::ADMIN], &active);

        assert_eq!(codes(&visible), vec!["DASHBOARD", "CHAT"]);
        assert!(!registry.has_module_access("USERS", &[Role::ADMIN], &active));
    }

    #[test]
    fn empty_active_set_shows_nothing() {
        let registry = ModuleRegistry::with_defaults();
        assert!(registry.get_visible_modules(&[Role::ADMIN], &[]).is_empty());
    }

    #[test]
    fn unknown_module_has_no_access() {
        let registry = ModuleRegistry::with_defaults();
        let active = vec![ModuleCode::from("GHOST")];
        assert!(!registry.has_module_access("GHOST", &[Role::ADMIN], &active));
    }

    #[test]
    fn category_filter_is_exact() {
        let registry = ModuleRegistry::with_defaults();
        let active = all_active(&registry);

        let org = registry.get_modules_by_category("organization", &[Role::ADMIN], &active);
        assert_eq!(codes(&org), vec!["EMPLOYEES", "DEPARTMENTS", "POSITIONS"]);

        assert!(registry
            .get_modules_by_category("Organization", &[Role::ADMIN], &active)
            .is_empty());
    }

    #[test]
    fn ties_keep_registry_order() {
        let registry = ModuleRegistry::new(vec![
            ModuleDefinition::new("C", "C", "/c", "x", [Role::USER], 2),
            ModuleDefinition::new("A", "A", "/a", "x", [Role::USER], 1),
            ModuleDefinition::new("B", "B", "/b", "x", [Role::USER], 2),
            ModuleDefinition::new("D", "D", "/d", "x", [Role::USER], 1),
        ])
        .unwrap();
        let active = all_active(&registry);

        let visible = registry.get_visible_modules(&[Role::USER], &active);

        assert_eq!(codes(&visible), vec!["A", "D", "C", "B"]);
    }

    fn arb_registry() -> impl Strategy<Value = ModuleRegistry> {
        let role = prop_oneof![
            Just(Role::ADMIN),
            Just(Role::MANAGER),
            Just(Role::HR),
            Just(Role::EMPLOYEE),
        ];
        prop::collection::vec((prop::collection::vec(role, 0..3), 0i32..5), 0..12).prop_map(|entries| {
            let definitions = entries
                .into_iter()
                .enumerate()
                .map(|(idx, (roles, order))| {
                    ModuleDefinition::new(format!("M{idx}"), format!("Module {idx}"), "/m", "x", roles, order)
                })
                .collect();
            ModuleRegistry::new(definitions).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: visible modules are active, role-permitted, sorted by
        /// order, and repeated calls give the same sequence.
        #[test]
        fn visible_modules_are_filtered_sorted_and_idempotent(
            registry in arb_registry(),
            active_mask in prop::collection::vec(any::<bool>(), 12),
            held_admin in any::<bool>(),
            held_hr in any::<bool>(),
        ) {
            let active: Vec<ModuleCode> = registry
                .definitions()
                .iter()
                .zip(active_mask.iter())
                .filter(|(_, on)| **on)
                .map(|(d, _)| d.code.clone())
                .collect();
            let mut held = Vec::new();
            if held_admin { held.push(Role::ADMIN); }
            if held_hr { held.push(Role::HR); }

            let visible = registry.get_visible_modules(&held, &active);

            for m in &visible {
                prop_assert!(active.contains(&m.code));
                prop_assert!(m.allows_any(&held));
            }
            prop_assert!(visible.windows(2).all(|w| w[0].order <= w[1].order));
            let again = registry.get_visible_modules(&held, &active);
            prop_assert_eq!(&visible, &again);

            let expected = registry
                .definitions()
                .iter()
                .filter(|d| active.contains(&d.code) && d.allows_any(&held))
                .count();
            prop_assert_eq!(visible.len(), expected);
        }
    }
}
