//! Namespaced persistent state for SnApps.
//!
//! One store serves every SnApp, partitioned by namespace (defaulting to
//! the app id). Entries carry a creation time, an optional expiry, an
//! encryption flag, and a format version; the filesystem holds the
//! authoritative copies while a per-namespace in-memory mirror serves
//! repeated reads.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod change;
pub mod cipher;
pub mod entry;
pub mod error;
pub mod store;

pub use change::{ChangeEvent, ChangeListenerId};
pub use cipher::StateCipher;
pub use entry::{ENTRY_FORMAT_VERSION, StateEntry};
pub use error::{StateError, StateResult};
pub use store::{PersistOptions, StateStats, StateStore, default_state_dir};
