use std::sync::Arc;

use crate::session::{Session, SessionState, SessionStore};
use crate::Role;

/// Read-only view of the session for UI surfaces.
///
/// Owns no state: every accessor reads through to the [`SessionStore`], so
/// there is exactly one copy of who is signed in.
#[derive(Debug, Clone)]
pub struct AuthContext {
    store: Arc<SessionStore>,
}

impl AuthContext {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn user(&self) -> Option<Session> {
        self.store.session()
    }

    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.store.roles()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.store.has_role(role)
    }
}
