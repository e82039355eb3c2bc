//! SnApp lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle state of a registered SnApp.
///
/// The lifecycle driver owns all transitions between these states; see
/// the driver's transition table for which moves are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnappState {
    /// Catalogued but not loaded.
    Registered,
    /// Load in progress.
    Loading,
    /// Entry module loaded, not yet activated.
    Loaded,
    /// Activation in progress.
    Activating,
    /// Running.
    Active,
    /// Suspension in progress.
    Suspending,
    /// Suspended; may be re-activated.
    Suspended,
    /// Teardown in progress.
    Unloading,
    /// A lifecycle operation failed; recoverable only via unload.
    Error,
}

impl fmt::Display for SnappState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
            Self::Suspending => write!(f, "suspending"),
            Self::Suspended => write!(f, "suspended"),
            Self::Unloading => write!(f, "unloading"),
            Self::Error => write!(f, "error"),
        }
    }
}
