//! Module Availability Store.
//!
//! Holds the backend-reported module list and the derived set of active
//! codes. Invariants:
//!
//! - `active_module_codes == modules.filter(is_active).map(code)` (in
//!   `modules` order) after every mutation. Only [`ModuleStore::set_modules`],
//!   [`ModuleStore::commit_fetch`], [`ModuleStore::toggle_module_status`] and
//!   [`ModuleStore::clear_modules`] touch either field, and all of them
//!   recompute the projection from the full list.
//! - `should_refetch()` iff `last_fetched` is absent or older than the TTL.
//! - A fetch result is committed only if its ticket is the most recently
//!   issued one; `set_modules()` and `clear_modules()` retire every
//!   outstanding ticket.
//!
//! The store never fetches anything itself.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use velithra_core::{load_state, save_state, Clock, StateStorage};

use crate::definition::{ModuleCode, ModuleConfig};

/// Storage key for persisted module state.
pub const MODULES_STORAGE_KEY: &str = "velithra-modules";

/// Default staleness window (5 minutes).
pub const DEFAULT_MODULE_TTL_MS: i64 = 300_000;

pub fn default_module_ttl() -> Duration {
    Duration::milliseconds(DEFAULT_MODULE_TTL_MS)
}

/// Proof that a fetch was started; required to commit its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Read-only copy of the store state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleSnapshot {
    pub modules: Vec<ModuleConfig>,
    pub active_module_codes: Vec<ModuleCode>,
    pub last_fetched: Option<DateTime<Utc>>,
    pub is_loading: bool,
}

#[derive(Debug, Default)]
struct ModuleState {
    modules: Vec<ModuleConfig>,
    active_module_codes: Vec<ModuleCode>,
    last_fetched: Option<DateTime<Utc>>,
    is_loading: bool,
    generation: u64,
}

impl ModuleState {
    fn replace_modules(&mut self, modules: Vec<ModuleConfig>, now: DateTime<Utc>) {
        self.modules = modules;
        self.recompute_active();
        self.last_fetched = Some(now);
    }

    fn recompute_active(&mut self) {
        self.active_module_codes = active_codes(&self.modules);
    }
}

fn active_codes(modules: &[ModuleConfig]) -> Vec<ModuleCode> {
    modules
        .iter()
        .filter(|m| m.is_active)
        .map(|m| m.code().clone())
        .collect()
}

/// Persisted subset of the state. `is_loading` is transient and never stored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedModules {
    modules: Vec<ModuleConfig>,
    active_module_codes: Vec<ModuleCode>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_fetched: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct ModuleStore {
    state: RwLock<ModuleState>,
    storage: Arc<dyn StateStorage>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ModuleStore {
    pub fn new(storage: Arc<dyn StateStorage>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(storage, clock, default_module_ttl())
    }

    pub fn with_ttl(storage: Arc<dyn StateStorage>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            state: RwLock::new(ModuleState::default()),
            storage,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, ModuleState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ModuleState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore persisted state. The active-code projection is recomputed from
    /// the restored modules rather than trusted.
    pub fn hydrate(&self) {
        let persisted = match load_state::<PersistedModules>(self.storage.as_ref(), MODULES_STORAGE_KEY) {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted modules");
                return;
            }
        };

        let mut state = self.write();
        state.modules = persisted.modules;
        state.recompute_active();
        state.last_fetched = persisted.last_fetched;
        if state.active_module_codes != persisted.active_module_codes {
            tracing::warn!("persisted active module codes diverged from modules; recomputed");
        }
        tracing::debug!(modules = state.modules.len(), "module state restored");
    }

    /// Replace the module list wholesale and stamp `last_fetched = now`.
    ///
    /// Supersedes any fetch in flight: its ticket can no longer commit.
    pub fn set_modules(&self, modules: Vec<ModuleConfig>) {
        let now = self.clock.now();
        let mut state = self.write();
        state.replace_modules(modules, now);
        state.generation += 1;
        state.is_loading = false;
        self.persist(&state);
    }

    /// Flip one module's status. Returns false if the code is unknown.
    pub fn toggle_module_status(&self, code: &str, is_active: bool) -> bool {
        let mut state = self.write();
        let Some(module) = state.modules.iter_mut().find(|m| m.code().as_str() == code) else {
            return false;
        };
        module.is_active = is_active;
        state.recompute_active();
        self.persist(&state);
        true
    }

    pub fn is_module_active(&self, code: &str) -> bool {
        self.read()
            .active_module_codes
            .iter()
            .any(|c| c.as_str() == code)
    }

    pub fn should_refetch(&self) -> bool {
        let now = self.clock.now();
        match self.read().last_fetched {
            None => true,
            Some(at) => now - at > self.ttl,
        }
    }

    pub fn update_last_fetched(&self) {
        let now = self.clock.now();
        let mut state = self.write();
        state.last_fetched = Some(now);
        self.persist(&state);
    }

    /// Reset to empty (logout). Outstanding fetch tickets become stale.
    pub fn clear_modules(&self) {
        let mut state = self.write();
        state.modules.clear();
        state.active_module_codes.clear();
        state.last_fetched = None;
        state.is_loading = false;
        state.generation += 1;
        self.persist(&state);
        tracing::info!("module state cleared");
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.write().is_loading = is_loading;
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    /// Start a fetch: issues a new generation and marks the store loading.
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut state = self.write();
        state.generation += 1;
        state.is_loading = true;
        FetchTicket(state.generation)
    }

    /// Commit a fetch result if `ticket` is still current.
    ///
    /// Returns false (and changes nothing) when a newer fetch was started or
    /// the store was cleared after this ticket was issued.
    pub fn commit_fetch(&self, ticket: FetchTicket, modules: Vec<ModuleConfig>) -> bool {
        let now = self.clock.now();
        let mut state = self.write();
        if ticket.0 != state.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = state.generation,
                "discarding stale module fetch"
            );
            return false;
        }
        state.replace_modules(modules, now);
        state.is_loading = false;
        self.persist(&state);
        true
    }

    /// A current fetch failed: stop loading, keep existing data.
    pub fn abandon_fetch(&self, ticket: FetchTicket) {
        let mut state = self.write();
        if ticket.0 == state.generation {
            state.is_loading = false;
        }
    }

    pub fn modules(&self) -> Vec<ModuleConfig> {
        self.read().modules.clone()
    }

    pub fn active_module_codes(&self) -> Vec<ModuleCode> {
        self.read().active_module_codes.clone()
    }

    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.read().last_fetched
    }

    pub fn snapshot(&self) -> ModuleSnapshot {
        let state = self.read();
        ModuleSnapshot {
            modules: state.modules.clone(),
            active_module_codes: state.active_module_codes.clone(),
            last_fetched: state.last_fetched,
            is_loading: state.is_loading,
        }
    }

    fn persist(&self, state: &ModuleState) {
        let persisted = PersistedModules {
            modules: state.modules.clone(),
            active_module_codes: state.active_module_codes.clone(),
            last_fetched: state.last_fetched,
        };
        if let Err(err) = save_state(self.storage.as_ref(), MODULES_STORAGE_KEY, &persisted) {
            tracing::warn!(error = %err, "failed to persist module state");
        }
    }
}
