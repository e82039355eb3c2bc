//! State store error types.
//!
//! Only write-side failures surface as errors; read-side failures
//! (missing files, corrupt entries, failed decryption) degrade to the
//! caller's default value and are logged.

use std::path::PathBuf;

/// Errors from state store operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// An entry could not be serialized for writing.
    #[error("failed to serialize state entry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A filesystem operation failed.
    #[error("state I/O error at {path}: {source}")]
    Io {
        /// The path being written or removed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configured cipher failed to encrypt an entry.
    #[error("encryption failed: {0}")]
    Encrypt(#[source] anyhow::Error),
}

impl StateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for state store operations.
pub type StateResult<T> = Result<T, StateError>;
