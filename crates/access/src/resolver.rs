//! Authorization Resolver.
//!
//! Combines session roles, the role permission table, the module registry and
//! the availability store into the decisions UI surfaces need. Every method is
//! read-only and total: no input makes it error or panic.

use std::sync::Arc;

use velithra_auth::{
    authorize_endpoint, authorize_route, explain_route, AccessDenied, Role, RoleRegistry, RouteExplanation,
    SessionStore,
};
use velithra_modules::{ModuleCode, ModuleDefinition, ModuleRegistry, ModuleStore};

#[derive(Debug, Clone)]
pub struct AccessResolver {
    roles: Arc<RoleRegistry>,
    modules: Arc<ModuleRegistry>,
    availability: Arc<ModuleStore>,
    session: Arc<SessionStore>,
}

impl AccessResolver {
    pub fn new(
        roles: Arc<RoleRegistry>,
        modules: Arc<ModuleRegistry>,
        availability: Arc<ModuleStore>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            roles,
            modules,
            availability,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn role_registry(&self) -> &RoleRegistry {
        &self.roles
    }

    /// Held roles, or `None` when nobody is signed in (or still loading).
    pub(crate) fn held_roles(&self) -> Option<Vec<Role>> {
        self.session.session().map(|s| s.roles)
    }

    /// Active codes; empty until the store has been populated at least once.
    /// Triggering the fetch is the caller's job.
    fn active_codes(&self) -> Vec<ModuleCode> {
        if self.availability.last_fetched().is_none() {
            return Vec::new();
        }
        self.availability.active_module_codes()
    }

    /// Navigation entries for the signed-in user, sorted by `order`.
    pub fn navigation(&self) -> Vec<ModuleDefinition> {
        let Some(roles) = self.held_roles() else {
            return Vec::new();
        };
        self.modules.get_visible_modules(&roles, &self.active_codes())
    }

    pub fn modules_in_category(&self, category: &str) -> Vec<ModuleDefinition> {
        let Some(roles) = self.held_roles() else {
            return Vec::new();
        };
        self.modules
            .get_modules_by_category(category, &roles, &self.active_codes())
    }

    pub fn has_module_access(&self, code: &str) -> bool {
        let Some(roles) = self.held_roles() else {
            return false;
        };
        self.modules
            .has_module_access(code, &roles, &self.active_codes())
    }

    /// Route decision: granted if **any** held role's prefixes cover it.
    pub fn can_access_route(&self, route: &str) -> bool {
        self.require_route(route).is_ok()
    }

    pub fn require_route(&self, route: &str) -> Result<(), AccessDenied> {
        let roles = self.held_roles().ok_or(AccessDenied::Unauthenticated)?;
        authorize_route(&self.roles, &roles, route)
    }

    /// Which held roles grant `route`; `None` when nobody is signed in.
    pub fn explain_route(&self, route: &str) -> Option<RouteExplanation> {
        let roles = self.held_roles()?;
        Some(explain_route(&self.roles, &roles, route))
    }

    /// Advisory endpoint decision.
    ///
    /// A `false` here should stop the client from sending the request at all,
    /// but a `true` grants nothing: the backend decides.
    pub fn can_access_endpoint(&self, endpoint: &str) -> bool {
        self.require_endpoint(endpoint).is_ok()
    }

    pub fn require_endpoint(&self, endpoint: &str) -> Result<(), AccessDenied> {
        let roles = self.held_roles().ok_or(AccessDenied::Unauthenticated)?;
        authorize_endpoint(&self.roles, &roles, endpoint)
    }

    /// Where to send the user after authentication.
    pub fn landing_route(&self) -> Option<String> {
        let roles = self.held_roles()?;
        self.roles.panel_route_for(&roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use velithra_auth::{RoleConfig, RolePermissions, Session};
    use velithra_core::{InMemoryStorage, StateStorage, SystemClock};
    use velithra_modules::ModuleConfig;

    struct Fixture {
        session: Arc<SessionStore>,
        store: Arc<ModuleStore>,
        roles: Arc<RoleRegistry>,
        resolver: AccessResolver,
    }

    fn fixture() -> Fixture {
        let storage: Arc<dyn StateStorage> = Arc::new(InMemoryStorage::new());
        let session = Arc::new(SessionStore::new(storage.clone()));
        let store = Arc::new(ModuleStore::new(storage, Arc::new(SystemClock)));
        let roles = Arc::new(RoleRegistry::with_defaults());
        let resolver = AccessResolver::new(
            roles.clone(),
            Arc::new(ModuleRegistry::with_defaults()),
            store.clone(),
            session.clone(),
        );
        Fixture {
            session,
            store,
            roles,
            resolver,
        }
    }

    fn activate_all(store: &ModuleStore) {
        let modules = ModuleRegistry::with_defaults()
            .definitions()
            .iter()
            .cloned()
            .map(|d| ModuleConfig::new(d, true))
            .collect();
        store.set_modules(modules);
    }

    fn codes(mods: &[ModuleDefinition]) -> Vec<&str> {
        mods.iter().map(|m| m.code.as_str()).collect()
    }

    #[test]
    fn unauthenticated_gets_nothing() {
        let fx = fixture();
        activate_all(&fx.store);
        fx.session.hydrate();

        assert!(fx.resolver.navigation().is_empty());
        assert!(!fx.resolver.can_access_route("/dashboard"));
        assert_eq!(
            fx.resolver.require_endpoint("/api/user"),
            Err(AccessDenied::Unauthenticated)
        );
        assert_eq!(fx.resolver.landing_route(), None);
    }

    #[test]
    fn unpopulated_store_shows_empty_navigation() {
        let fx = fixture();
        fx.session
            .login(Session::new("ada", "ada@velithra.io", [Role::ADMIN]));

        assert!(fx.resolver.navigation().is_empty());
        assert!(!fx.resolver.has_module_access("USERS"));
        // Route checks do not depend on module availability.
        assert!(fx.resolver.can_access_route("/dashboard/users"));
    }

    #[test]
    fn hr_navigation_is_role_and_status_filtered() {
        let fx = fixture();
        activate_all(&fx.store);
        fx.store.toggle_module_status("COURSES", false);
        fx.session
            .login(Session::new("hana", "hana@velithra.io", [Role::HR]));

        let nav = fx.resolver.navigation();

        assert_eq!(
            codes(&nav),
            vec!["DASHBOARD", "DEPARTMENTS", "POSITIONS", "HR", "NOTIFICATIONS", "CHAT"]
        );
        assert!(!fx.resolver.has_module_access("EMPLOYEES"));
        assert_eq!(
            codes(&fx.resolver.modules_in_category("communication")),
            vec!["NOTIFICATIONS", "CHAT"]
        );
    }

    #[test]
    fn route_access_is_any_of_held_roles() {
        let fx = fixture();
        fx.session.login(Session::new(
            "sam",
            "sam@velithra.io",
            [Role::EMPLOYEE, Role::HR],
        ));

        assert!(fx.resolver.can_access_route("/employee/tasks"));
        assert!(fx.resolver.can_access_route("/hr/employees/create"));
        assert!(!fx.resolver.can_access_route("/dashboard/users"));
        assert_eq!(fx.resolver.landing_route().as_deref(), Some("/employee"));
    }

    #[test]
    fn endpoint_check_is_advisory_fail_fast() {
        let fx = fixture();
        fx.session
            .login(Session::new("hana", "hana@velithra.io", [Role::HR]));

        assert!(fx.resolver.can_access_endpoint("/api/employee/12"));
        assert_eq!(
            fx.resolver.require_endpoint("/api/role/3"),
            Err(AccessDenied::Endpoint("/api/role/3".to_string()))
        );
    }

    #[test]
    fn dynamically_added_role_is_honoured() {
        let fx = fixture();
        fx.roles
            .add_role(
                RoleConfig::new("Auditor", "Auditor", "/audit").with_permissions(
                    RolePermissions::new(Vec::<String>::new(), ["/audit"]).unwrap(),
                ),
            )
            .unwrap();
        fx.session
            .login(Session::new("aud", "aud@velithra.io", [Role::new("Auditor")]));

        assert!(fx.resolver.can_access_route("/audit"));
        assert!(!fx.resolver.can_access_route("/audit-logs"));
        assert_eq!(fx.resolver.landing_route().as_deref(), Some("/audit"));
    }

    #[test]
    fn explains_which_roles_grant_a_route() {
        let fx = fixture();
        assert_eq!(fx.resolver.explain_route("/hr"), None);

        fx.session.login(Session::new(
            "sam",
            "sam@velithra.io",
            [Role::new("Ghost"), Role::EMPLOYEE, Role::HR],
        ));

        let explanation = fx.resolver.explain_route("/courses/7").unwrap();
        assert!(explanation.granted);
        assert_eq!(explanation.granting_roles, vec!["Employee", "HR"]);
        assert_eq!(explanation.unknown_roles, vec!["Ghost"]);

        let denied = fx.resolver.explain_route("/dashboard/users").unwrap();
        assert!(!denied.granted);
        assert!(denied.granting_roles.is_empty());
        assert!(std::ptr::eq(fx.resolver.role_registry(), fx.roles.as_ref()));
    }

    #[test]
    fn cleared_store_hides_navigation_again() {
        let fx = fixture();
        activate_all(&fx.store);
        fx.session
            .login(Session::new("ada", "ada@velithra.io", [Role::ADMIN]));
        assert!(!fx.resolver.navigation().is_empty());

        fx.store.clear_modules();

        assert!(fx.resolver.navigation().is_empty());
    }
}
