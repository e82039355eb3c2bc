//! Per-SnApp logging.

use snapper_core::SnappId;

/// A logger that stamps every record with its SnApp's id and an optional
/// child prefix.
///
/// Records flow into the host's `tracing` subscriber; the façade adds
/// attribution so one sink can serve every app.
#[derive(Debug, Clone)]
pub struct SnappLogger {
    snapp: SnappId,
    prefix: Option<String>,
}

impl SnappLogger {
    pub(crate) fn new(snapp: SnappId) -> Self {
        Self {
            snapp,
            prefix: None,
        }
    }

    /// Derive a logger whose records carry an additional prefix.
    ///
    /// Nested children chain their prefixes with `:`.
    #[must_use]
    pub fn child(&self, prefix: impl Into<String>) -> Self {
        let prefix = match &self.prefix {
            Some(existing) => format!("{existing}:{}", prefix.into()),
            None => prefix.into(),
        };
        Self {
            snapp: self.snapp.clone(),
            prefix: Some(prefix),
        }
    }

    fn format(&self, message: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("[{prefix}] {message}"),
            None => message.to_string(),
        }
    }

    /// Log at trace level.
    pub fn trace(&self, message: &str) {
        tracing::trace!(snapp_id = %self.snapp, "{}", self.format(message));
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        tracing::debug!(snapp_id = %self.snapp, "{}", self.format(message));
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        tracing::info!(snapp_id = %self.snapp, "{}", self.format(message));
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        tracing::warn!(snapp_id = %self.snapp, "{}", self.format(message));
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        tracing::error!(snapp_id = %self.snapp, "{}", self.format(message));
    }
}
