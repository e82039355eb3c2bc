//! Lifecycle error types.

use snapper_core::SnappState;

/// Errors from lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The requested move is not in the transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// The state the SnApp was in.
        from: SnappState,
        /// The state the operation tried to reach.
        to: SnappState,
    },

    /// The record is in a shape the operation cannot work with (e.g. an
    /// active SnApp with no instance attached).
    #[error("precondition violated for {operation} in state {state}")]
    PreconditionViolated {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the SnApp was in.
        state: SnappState,
    },

    /// The loader failed; the SnApp is now in the error state.
    #[error("load failed")]
    LoadFailure(#[source] anyhow::Error),

    /// The factory failed to produce an instance; the SnApp is now in the
    /// error state.
    #[error("factory failed")]
    FactoryFailure(#[source] anyhow::Error),

    /// An instance callback failed; the SnApp is now in the error state.
    #[error("{callback} callback failed")]
    CallbackFailure {
        /// Which callback failed (`on_activate`, `on_suspend`, `on_destroy`).
        callback: &'static str,
        /// The callback's error.
        #[source]
        cause: anyhow::Error,
    },
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
