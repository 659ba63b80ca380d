//! Composition root: one [`AppState`] owns every store and registry and hands
//! out read access to UI surfaces.

use std::sync::Arc;

use velithra_access::AccessResolver;
use velithra_auth::{AuthContext, RoleRegistry, Session, SessionState, SessionStore};
use velithra_core::{Clock, FileStorage, StateStorage, SystemClock};
use velithra_modules::{ModuleRegistry, ModuleStore};

use crate::api::{ApiClient, RegisterRequest};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::sync::{ModuleSync, RefreshOutcome};

/// Application state shared by the CLI and any UI shell.
#[derive(Debug, Clone)]
pub struct AppState {
    config: ClientConfig,
    api: ApiClient,
    session: Arc<SessionStore>,
    modules: Arc<ModuleStore>,
    sync: ModuleSync,
    access: AccessResolver,
}

impl AppState {
    /// Build with file-backed storage under `config.data_dir`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let storage = FileStorage::open(&config.data_dir)?;
        tracing::debug!(dir = %storage.dir().display(), "file storage opened");
        Ok(Self::with_storage(config, Arc::new(storage), Arc::new(SystemClock)))
    }

    pub fn with_storage(config: ClientConfig, storage: Arc<dyn StateStorage>, clock: Arc<dyn Clock>) -> Self {
        let api = ApiClient::new(config.api_url.clone());
        let roles = Arc::new(RoleRegistry::with_defaults_matching(config.route_matching));
        let registry = Arc::new(ModuleRegistry::with_defaults());
        let session = Arc::new(SessionStore::new(storage.clone()));
        let modules = Arc::new(ModuleStore::with_ttl(storage, clock, config.module_ttl));
        let sync = ModuleSync::new(api.clone(), registry.clone(), modules.clone());
        let access = AccessResolver::new(roles, registry, modules.clone(), session.clone());

        Self {
            config,
            api,
            session,
            modules,
            sync,
            access,
        }
    }

    /// Restore persisted session and module state.
    pub fn hydrate(&self) -> SessionState {
        self.modules.hydrate();
        self.session.hydrate()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn access(&self) -> &AccessResolver {
        &self.access
    }

    pub fn auth(&self) -> AuthContext {
        AuthContext::new(self.session.clone())
    }

    pub fn modules(&self) -> &ModuleStore {
        &self.modules
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let resp = self.api.login(email, password).await?;
        Ok(self.start_session(resp.into_session()).await)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, ClientError> {
        let resp = self.api.register(request).await?;
        Ok(self.start_session(resp.into_session()).await)
    }

    async fn start_session(&self, session: Session) -> Session {
        self.session.login(session.clone());
        if let Err(err) = self.refresh_modules(true).await {
            tracing::warn!(error = %err, "initial module refresh failed");
        }
        session
    }

    /// Clear the session and module cache. Fetches still in flight are
    /// invalidated and will not write.
    pub fn logout(&self) {
        self.modules.clear_modules();
        self.session.logout();
    }

    pub async fn refresh_modules(&self, force: bool) -> Result<RefreshOutcome, ClientError> {
        let token = self.session.access_token();
        Ok(self.sync.refresh(token.as_deref(), force).await?)
    }

    /// GET `path` on the backend.
    ///
    /// The local endpoint check only short-circuits requests that would be
    /// refused anyway; the backend still enforces access.
    pub async fn request(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let endpoint = path.split(['?', '#']).next().unwrap_or(path);
        self.access.require_endpoint(endpoint)?;
        let token = self.session.access_token();
        Ok(self.api.get_json(path, token.as_deref()).await?)
    }
}
