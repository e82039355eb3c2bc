//! The valid-transition table.

use snapper_core::SnappState;

/// Whether the lifecycle permits moving `from → to`.
///
/// Self-transitions (`x → x`) are permitted no-ops for every state.
#[must_use]
pub fn is_valid_transition(from: SnappState, to: SnappState) -> bool {
    use SnappState::{
        Activating, Active, Error, Loaded, Loading, Registered, Suspended, Suspending, Unloading,
    };

    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (Registered, Loading)
            | (Loading, Loaded | Error)
            | (Loaded, Activating | Unloading)
            | (Activating, Active | Error)
            | (Active, Suspending | Unloading)
            | (Suspending, Suspended | Error)
            | (Suspended, Activating | Unloading)
            | (Unloading, Registered | Error)
            | (Error, Unloading)
    )
}
