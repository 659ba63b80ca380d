//! Versioned envelope for persisted store state.
//!
//! The on-disk shape is `{"state": {...}, "version": N}`. Only the fields a
//! store explicitly places in its persisted struct are written.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::storage::StateStorage;

/// Current envelope version. Payloads with another version are ignored.
pub const STATE_VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState<T> {
    pub state: T,
    pub version: u32,
}

/// Load and decode a store's persisted state.
///
/// Returns `Ok(None)` when nothing is stored or the stored version differs.
pub fn load_state<T>(storage: &dyn StateStorage, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
{
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };

    let envelope: PersistedState<T> =
        serde_json::from_str(&raw).map_err(|e| StorageError::serde(key, e))?;

    if envelope.version != STATE_VERSION {
        tracing::warn!(
            key,
            found = envelope.version,
            expected = STATE_VERSION,
            "ignoring persisted state with unknown version"
        );
        return Ok(None);
    }

    Ok(Some(envelope.state))
}

/// Encode and write a store's persisted state.
pub fn save_state<T>(storage: &dyn StateStorage, key: &str, state: &T) -> StorageResult<()>
where
    T: Serialize,
{
    let envelope = PersistedState {
        state,
        version: STATE_VERSION,
    };
    let raw = serde_json::to_string(&envelope).map_err(|e| StorageError::serde(key, e))?;
    storage.set_item(key, &raw)
}
