//! Terminal command registration and execution.
//!
//! Commands are stored under `<snapp>:<name>`; the terminal shell passes
//! full command lines and the façade tokenizes on whitespace, looking up
//! the first token verbatim. Only positional arguments are parsed here —
//! `options` and `flags` exist for a higher-level parser to fill.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, info};

use snapper_core::SnappId;

/// Parsed arguments handed to a command handler.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    /// Whitespace-separated tokens after the command name.
    pub positional: Vec<String>,
    /// Named options. The core never populates these.
    pub options: HashMap<String, String>,
    /// Boolean flags. The core never populates these.
    pub flags: Vec<String>,
    /// The full command line as received.
    pub raw: String,
}

/// The result a command reports back to the shell.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Whether the command succeeded.
    pub success: bool,
    /// Text for the shell to show.
    pub message: Option<String>,
    /// Structured result data, if any.
    pub data: Option<Value>,
}

impl CommandOutput {
    /// A bare success.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }

    /// A success with a message for the shell.
    #[must_use]
    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    /// A failure with a message for the shell.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Reply callback type; sends a line of output back to the shell.
pub(crate) type ReplyFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Execution context handed to a command handler.
#[derive(Clone)]
pub struct CommandContext {
    /// The current session, if one is active.
    pub session_id: Option<String>,
    snapp: SnappId,
    reply: ReplyFn,
}

impl CommandContext {
    pub(crate) fn new(snapp: SnappId, session_id: Option<String>, reply: ReplyFn) -> Self {
        Self {
            session_id,
            snapp,
            reply,
        }
    }

    /// Send a line of output back to the shell.
    pub fn reply(&self, text: &str) {
        (self.reply)(text);
    }

    /// Start a progress tracker for a long-running command.
    #[must_use]
    pub fn progress(&self, label: impl Into<String>) -> ProgressTracker {
        ProgressTracker {
            snapp: self.snapp.clone(),
            label: label.into(),
        }
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("session_id", &self.session_id)
            .field("snapp", &self.snapp)
            .finish_non_exhaustive()
    }
}

/// Reports progress of a long-running command into the log stream.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    snapp: SnappId,
    label: String,
}

impl ProgressTracker {
    /// Report progress.
    pub fn update(&self, percent: u8, message: &str) {
        debug!(
            snapp_id = %self.snapp,
            label = %self.label,
            percent,
            "{message}"
        );
    }

    /// Mark the tracked work finished.
    pub fn finish(&self) {
        info!(snapp_id = %self.snapp, label = %self.label, "Done");
    }
}

/// A registered command handler.
pub(crate) type CommandHandler =
    Arc<dyn Fn(CommandArgs, CommandContext) -> BoxFuture<'static, anyhow::Result<CommandOutput>> + Send + Sync>;

pub(crate) struct RegisteredCommand {
    pub(crate) description: String,
    pub(crate) handler: CommandHandler,
}
