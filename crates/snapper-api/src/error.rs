//! Façade error types.

use snapper_core::Permission;

/// Errors surfaced to SnApps through the façade.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The app does not hold the capability the operation requires.
    #[error("permission denied: {0}")]
    PermissionDenied(Permission),

    /// A state store operation failed.
    #[error(transparent)]
    State(#[from] snapper_state::StateError),

    /// A bus operation failed.
    #[error(transparent)]
    Bus(#[from] snapper_bus::BusError),

    /// A host-bound payload could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for façade operations.
pub type ApiResult<T> = Result<T, ApiError>;
