//! Capability tags granted to SnApps.
//!
//! The permission set is closed: a manifest may declare arbitrary strings,
//! but only the tags below are ever granted. Unknown tags are kept as raw
//! strings by the manifest validator and reported as warnings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a permission tag string is not in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission tag: {0}")]
pub struct PermissionParseError(pub String);

/// A capability tag from the closed permission set.
///
/// Tags use a `domain:action` form (`storage:read`, `ui:tab`, …). The
/// API façade checks these before every gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Read entries from the state store.
    #[serde(rename = "storage:read")]
    StorageRead,
    /// Write entries to the state store.
    #[serde(rename = "storage:write")]
    StorageWrite,
    /// Remove entries from the state store.
    #[serde(rename = "storage:delete")]
    StorageDelete,
    /// Subscribe to host lifecycle hooks.
    #[serde(rename = "session:hook")]
    SessionHook,
    /// Inject context into the agent prompt.
    #[serde(rename = "prompt:inject")]
    PromptInject,
    /// Register workspace tabs.
    #[serde(rename = "ui:tab")]
    UiTab,
    /// Register side panels.
    #[serde(rename = "ui:panel")]
    UiPanel,
    /// Open modal dialogs.
    #[serde(rename = "ui:modal")]
    UiModal,
    /// Show toast notifications.
    #[serde(rename = "ui:toast")]
    UiToast,
    /// Register terminal commands.
    #[serde(rename = "command:register")]
    CommandRegister,
    /// Register agent tools.
    #[serde(rename = "tool:register")]
    ToolRegister,
    /// Wrap existing agent tools.
    #[serde(rename = "tool:wrap")]
    ToolWrap,
    /// Read files in the workspace.
    #[serde(rename = "fs:read")]
    FsRead,
    /// Write files in the workspace.
    #[serde(rename = "fs:write")]
    FsWrite,
    /// Publish messages on the bus.
    #[serde(rename = "bus:publish")]
    BusPublish,
    /// Subscribe to bus channels.
    #[serde(rename = "bus:subscribe")]
    BusSubscribe,
    /// Execute system processes.
    #[serde(rename = "system:exec")]
    SystemExec,
    /// Make outbound network requests.
    #[serde(rename = "network:request")]
    NetworkRequest,
}

impl Permission {
    /// The tag string for this permission (`domain:action` form).
    #[must_use]
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::StorageRead => "storage:read",
            Self::StorageWrite => "storage:write",
            Self::StorageDelete => "storage:delete",
            Self::SessionHook => "session:hook",
            Self::PromptInject => "prompt:inject",
            Self::UiTab => "ui:tab",
            Self::UiPanel => "ui:panel",
            Self::UiModal => "ui:modal",
            Self::UiToast => "ui:toast",
            Self::CommandRegister => "command:register",
            Self::ToolRegister => "tool:register",
            Self::ToolWrap => "tool:wrap",
            Self::FsRead => "fs:read",
            Self::FsWrite => "fs:write",
            Self::BusPublish => "bus:publish",
            Self::BusSubscribe => "bus:subscribe",
            Self::SystemExec => "system:exec",
            Self::NetworkRequest => "network:request",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "storage:read" => Ok(Self::StorageRead),
            "storage:write" => Ok(Self::StorageWrite),
            "storage:delete" => Ok(Self::StorageDelete),
            "session:hook" => Ok(Self::SessionHook),
            "prompt:inject" => Ok(Self::PromptInject),
            "ui:tab" => Ok(Self::UiTab),
            "ui:panel" => Ok(Self::UiPanel),
            "ui:modal" => Ok(Self::UiModal),
            "ui:toast" => Ok(Self::UiToast),
            "command:register" => Ok(Self::CommandRegister),
            "tool:register" => Ok(Self::ToolRegister),
            "tool:wrap" => Ok(Self::ToolWrap),
            "fs:read" => Ok(Self::FsRead),
            "fs:write" => Ok(Self::FsWrite),
            "bus:publish" => Ok(Self::BusPublish),
            "bus:subscribe" => Ok(Self::BusSubscribe),
            "system:exec" => Ok(Self::SystemExec),
            "network:request" => Ok(Self::NetworkRequest),
            other => Err(PermissionParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        let all = [
            Permission::StorageRead,
            Permission::StorageWrite,
            Permission::StorageDelete,
            Permission::SessionHook,
            Permission::PromptInject,
            Permission::UiTab,
            Permission::UiPanel,
            Permission::UiModal,
            Permission::UiToast,
            Permission::CommandRegister,
            Permission::ToolRegister,
            Permission::ToolWrap,
            Permission::FsRead,
            Permission::FsWrite,
            Permission::BusPublish,
            Permission::BusSubscribe,
            Permission::SystemExec,
            Permission::NetworkRequest,
        ];
        for p in all {
            let parsed: Permission = p.as_tag().parse().unwrap();
            assert_eq!(parsed, p);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!("storage:admin".parse::<Permission>().is_err());
        assert!("".parse::<Permission>().is_err());
        assert!("STORAGE:READ".parse::<Permission>().is_err());
    }

    #[test]
    fn test_serde_uses_tag_form() {
        let json = serde_json::to_string(&Permission::StorageRead).unwrap();
        assert_eq!(json, "\"storage:read\"");
        let parsed: Permission = serde_json::from_str("\"bus:publish\"").unwrap();
        assert_eq!(parsed, Permission::BusPublish);
    }
}
