//! `velithra-core`: foundation shared by the access crates.
//!
//! This crate contains **no authorization logic**: only the time source and
//! the durable client-side storage the stores persist through.

pub mod clock;
pub mod error;
pub mod persist;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StorageError, StorageResult};
pub use persist::{load_state, save_state, PersistedState, STATE_VERSION};
pub use storage::{FileStorage, InMemoryStorage, StateStorage};
