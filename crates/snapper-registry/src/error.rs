//! Registry error types.

use snapper_core::SnappId;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A SnApp with this ID is already catalogued.
    #[error("snapp already registered: {0}")]
    DuplicateId(SnappId),

    /// The requested SnApp is not in the catalog.
    #[error("snapp not found: {0}")]
    NotFound(SnappId),

    /// The manifest breaks a validation rule.
    #[error("invalid manifest ({field}): {message}")]
    InvalidManifest {
        /// The manifest field that failed validation.
        field: String,
        /// Why the field is invalid.
        message: String,
    },
}

impl RegistryError {
    /// Shorthand for an [`InvalidManifest`](Self::InvalidManifest) error.
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a missing required field.
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::InvalidManifest {
            message: format!("missing required field: {field}"),
            field,
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
