//! Module availability refresh.
//!
//! Each fetch takes a [`FetchTicket`](velithra_modules::FetchTicket) before it
//! goes to the network and commits through it afterwards, so a response that
//! arrives after a logout or a newer fetch is dropped instead of resurrecting
//! old state.

use std::sync::Arc;

use velithra_modules::{map_backend_modules, ModuleRegistry, ModuleStore};

use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cache still within its TTL; nothing fetched.
    Fresh,
    /// Backend list committed; carries the number of modules.
    Applied(usize),
    /// Response arrived after the store moved on and was dropped.
    Discarded,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("module fetch failed: {0}")]
    Fetch(#[from] ApiError),
}

#[derive(Debug, Clone)]
pub struct ModuleSync {
    api: ApiClient,
    registry: Arc<ModuleRegistry>,
    store: Arc<ModuleStore>,
}

impl ModuleSync {
    pub fn new(api: ApiClient, registry: Arc<ModuleRegistry>, store: Arc<ModuleStore>) -> Self {
        Self { api, registry, store }
    }

    /// Refresh from the backend unless the cache is fresh (`force` skips the
    /// TTL check). On failure the store keeps its current data.
    pub async fn refresh(&self, token: Option<&str>, force: bool) -> Result<RefreshOutcome, SyncError> {
        if !force && !self.store.should_refetch() {
            return Ok(RefreshOutcome::Fresh);
        }

        let ticket = self.store.begin_fetch();
        let backend = match self.api.fetch_modules(token).await {
            Ok(backend) => backend,
            Err(err) => {
                self.store.abandon_fetch(ticket);
                tracing::warn!(error = %err, status = ?err.status(), "module fetch failed; keeping cached modules");
                return Err(err.into());
            }
        };

        let modules = map_backend_modules(backend, &self.registry);
        let count = modules.len();
        if self.store.commit_fetch(ticket, modules) {
            tracing::info!(count, generation = ticket.generation(), "modules refreshed");
            Ok(RefreshOutcome::Applied(count))
        } else {
            Ok(RefreshOutcome::Discarded)
        }
    }
}
