//! Convenience re-exports for downstream crates.

pub use crate::change::{ChangeEvent, ChangeListenerId};
pub use crate::cipher::StateCipher;
pub use crate::entry::StateEntry;
pub use crate::error::{StateError, StateResult};
pub use crate::store::{PersistOptions, StateStore};
