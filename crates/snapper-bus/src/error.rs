//! Bus error types.

/// Errors from bus RPC operations. Pub/sub never fails — subscriber
/// errors are logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The target app has methods registered, but not this one.
    #[error("unknown method: {snapp}.{method}")]
    UnknownMethod {
        /// The target app.
        snapp: String,
        /// The requested method.
        method: String,
    },

    /// No response arrived within the request timeout.
    #[error("request to {snapp}.{method} timed out after {timeout_ms} ms")]
    RequestTimeout {
        /// The target app.
        snapp: String,
        /// The requested method.
        method: String,
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The registered handler returned an error.
    #[error("method {snapp}.{method} failed")]
    MethodFailed {
        /// The target app.
        snapp: String,
        /// The requested method.
        method: String,
        /// The handler's error.
        #[source]
        cause: anyhow::Error,
    },
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;
