//! Host lifecycle hook events and their typed payloads.
//!
//! `HookEvent` lives in `snapper-core` so that both `snapper-hooks` and
//! `snapper-api` can reference it without creating a circular dependency.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host lifecycle events that SnApps can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    /// A session has started.
    SessionStart,
    /// A session is ending.
    SessionEnd,
    /// Before the agent processes a prompt.
    BeforeAgent,
    /// After the agent produced a response.
    AfterAgent,
    /// Before a tool call is executed.
    BeforeTool,
    /// After a tool call completed successfully.
    AfterTool,
    /// A tool call resulted in an error.
    ToolError,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionStart => write!(f, "session_start"),
            Self::SessionEnd => write!(f, "session_end"),
            Self::BeforeAgent => write!(f, "before_agent"),
            Self::AfterAgent => write!(f, "after_agent"),
            Self::BeforeTool => write!(f, "before_tool"),
            Self::AfterTool => write!(f, "after_tool"),
            Self::ToolError => write!(f, "tool_error"),
        }
    }
}

/// Typed payload for each hook event.
///
/// One variant per [`HookEvent`]; the router dispatches on the payload's
/// event so a handler registered for `session_start` only ever observes
/// `SessionStart` data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HookPayload {
    /// Payload for [`HookEvent::SessionStart`].
    SessionStart {
        /// The session that started.
        session_id: String,
    },
    /// Payload for [`HookEvent::SessionEnd`].
    SessionEnd {
        /// The session that is ending.
        session_id: String,
    },
    /// Payload for [`HookEvent::BeforeAgent`].
    BeforeAgent {
        /// The active session.
        session_id: String,
        /// The prompt about to be processed.
        prompt: String,
    },
    /// Payload for [`HookEvent::AfterAgent`].
    AfterAgent {
        /// The active session.
        session_id: String,
        /// The agent's response text.
        response: String,
    },
    /// Payload for [`HookEvent::BeforeTool`].
    BeforeTool {
        /// The active session.
        session_id: String,
        /// Name of the tool about to run.
        tool: String,
        /// Tool input arguments.
        args: serde_json::Value,
    },
    /// Payload for [`HookEvent::AfterTool`].
    AfterTool {
        /// The active session.
        session_id: String,
        /// Name of the tool that ran.
        tool: String,
        /// Tool output.
        result: serde_json::Value,
    },
    /// Payload for [`HookEvent::ToolError`].
    ToolError {
        /// The active session.
        session_id: String,
        /// Name of the tool that failed.
        tool: String,
        /// Error description.
        error: String,
    },
}

impl HookPayload {
    /// The event this payload belongs to.
    #[must_use]
    pub fn event(&self) -> HookEvent {
        match self {
            Self::SessionStart { .. } => HookEvent::SessionStart,
            Self::SessionEnd { .. } => HookEvent::SessionEnd,
            Self::BeforeAgent { .. } => HookEvent::BeforeAgent,
            Self::AfterAgent { .. } => HookEvent::AfterAgent,
            Self::BeforeTool { .. } => HookEvent::BeforeTool,
            Self::AfterTool { .. } => HookEvent::AfterTool,
            Self::ToolError { .. } => HookEvent::ToolError,
        }
    }

    /// The session this payload refers to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::SessionStart { session_id }
            | Self::SessionEnd { session_id }
            | Self::BeforeAgent { session_id, .. }
            | Self::AfterAgent { session_id, .. }
            | Self::BeforeTool { session_id, .. }
            | Self::AfterTool { session_id, .. }
            | Self::ToolError { session_id, .. } => session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_event_display() {
        assert_eq!(HookEvent::SessionStart.to_string(), "session_start");
        assert_eq!(HookEvent::BeforeTool.to_string(), "before_tool");
        assert_eq!(HookEvent::ToolError.to_string(), "tool_error");
    }

    #[test]
    fn test_payload_event_mapping() {
        let p = HookPayload::BeforeTool {
            session_id: "s1".into(),
            tool: "read_file".into(),
            args: serde_json::json!({"path": "a.txt"}),
        };
        assert_eq!(p.event(), HookEvent::BeforeTool);
        assert_eq!(p.session_id(), "s1");
    }

    #[test]
    fn test_payload_serde_tags_event() {
        let p = HookPayload::SessionStart {
            session_id: "s1".into(),
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"event\":\"session_start\""));
        let parsed: HookPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }
}
