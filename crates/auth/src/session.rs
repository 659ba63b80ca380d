//! Session/role state: the single owner of "who is signed in".
//!
//! State machine:
//!
//! ```text
//! Unknown ──hydrate──▶ Authenticated{session} | Unauthenticated
//! Unauthenticated ──login──▶ Authenticated
//! Authenticated ──logout──▶ Unauthenticated
//! ```
//!
//! Protected surfaces render a loading state while `Unknown`.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Deserializer, Serialize};

use velithra_core::{load_state, save_state, StateStorage};

use crate::roles::{dedup_roles, roles_overlap};
use crate::Role;

/// Storage key for the persisted session.
pub const AUTH_STORAGE_KEY: &str = "velithra-auth";

/// An authenticated user as reported by login/register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_name: String,
    pub email: String,
    #[serde(deserialize_with = "deserialize_roles")]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            roles: dedup_roles(roles),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

fn deserialize_roles<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Role>::deserialize(deserializer).map(dedup_roles)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not yet hydrated from storage.
    #[default]
    Unknown,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAuth {
    user: Option<Session>,
    is_authenticated: bool,
}

/// Persisted session store.
///
/// Mutations are synchronous and hold the write lock while persisting, so
/// storage always sees writes in mutation order. A failed write is logged and
/// the in-memory state stays authoritative.
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn StateStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self {
            state: RwLock::new(SessionState::Unknown),
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Leave `Unknown` by reading persisted state.
    ///
    /// Unreadable or inconsistent persisted state resolves to
    /// `Unauthenticated`. Calling this after login/logout is a no-op.
    pub fn hydrate(&self) -> SessionState {
        let mut state = self.write();
        if *state != SessionState::Unknown {
            return state.clone();
        }

        let persisted = match load_state::<PersistedAuth>(self.storage.as_ref(), AUTH_STORAGE_KEY) {
            Ok(persisted) => persisted,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted session");
                None
            }
        };

        *state = match persisted {
            Some(PersistedAuth {
                user: Some(session),
                is_authenticated: true,
            }) => {
                tracing::info!(user = %session.user_name, "session restored");
                SessionState::Authenticated(session)
            }
            _ => SessionState::Unauthenticated,
        };
        state.clone()
    }

    /// Record a successful login or registration.
    pub fn login(&self, session: Session) {
        let mut state = self.write();
        tracing::info!(user = %session.user_name, roles = ?session.roles, "session started");
        self.persist(Some(&session));
        *state = SessionState::Authenticated(session);
    }

    pub fn logout(&self) {
        let mut state = self.write();
        if let SessionState::Authenticated(session) = &*state {
            tracing::info!(user = %session.user_name, "session ended");
        }
        self.persist(None);
        *state = SessionState::Unauthenticated;
    }

    fn persist(&self, session: Option<&Session>) {
        let persisted = PersistedAuth {
            user: session.cloned(),
            is_authenticated: session.is_some(),
        };
        if let Err(err) = save_state(self.storage.as_ref(), AUTH_STORAGE_KEY, &persisted) {
            tracing::warn!(error = %err, "failed to persist session");
        }
    }

    pub fn state(&self) -> SessionState {
        self.read().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.read().session().cloned()
    }

    /// Held roles; empty unless authenticated.
    pub fn roles(&self) -> Vec<Role> {
        self.read()
            .session()
            .map(|s| s.roles.clone())
            .unwrap_or_default()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().session().and_then(|s| s.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.read(), SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.read(), SessionState::Unknown)
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.read().session().is_some_and(|s| s.has_role(role))
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.read()
            .session()
            .is_some_and(|s| roles_overlap(&s.roles, roles))
    }
}
