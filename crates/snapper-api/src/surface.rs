//! Tab, panel, and toast definitions.
//!
//! Plain records the façade owns and echoes to the host; the core never
//! renders them.

use serde::{Deserialize, Serialize};

/// Options for registering a tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabOptions {
    /// Tab title shown in the navigation shell.
    pub title: String,
    /// Optional icon reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A registered tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDefinition {
    /// Generated id, `tab_<snapp>_<counter>`.
    pub id: String,
    /// Tab title.
    pub title: String,
    /// Optional icon reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Whether this is the app's active tab.
    pub active: bool,
}

/// Partial update for [`SnappApi::update_tab`](crate::SnappApi::update_tab).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    /// New title, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New icon, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// What happened to a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabEventKind {
    /// The tab was registered or brought to the front.
    Activated,
    /// The tab was unregistered.
    Closed,
    /// The tab's definition changed.
    Updated,
}

/// A tab event echoed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: TabEventKind,
    /// The tab the event refers to.
    pub tab_id: String,
}

/// Options for registering a panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOptions {
    /// Panel title.
    pub title: String,
    /// Optional icon reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Whether the panel starts expanded.
    #[serde(default)]
    pub expanded: bool,
}

/// A registered panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelDefinition {
    /// Generated id, `panel_<snapp>_<counter>`.
    pub id: String,
    /// Panel title.
    pub title: String,
    /// Optional icon reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Whether the panel is expanded.
    pub expanded: bool,
}

/// A panel event echoed to subscribers. Same shape as tab events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: TabEventKind,
    /// The panel the event refers to.
    pub panel_id: String,
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    /// Neutral information.
    #[default]
    Info,
    /// Operation succeeded.
    Success,
    /// Something needs attention.
    Warning,
    /// Something failed.
    Error,
}

/// A toast notification forwarded to the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastOptions {
    /// Toast body text.
    pub message: String,
    /// Severity.
    #[serde(default)]
    pub kind: ToastKind,
    /// How long to show the toast, in milliseconds. Host default if
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}
