//! On-disk state entry format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use snapper_core::now_millis;

/// Current on-disk entry format version.
pub const ENTRY_FORMAT_VERSION: u32 = 1;

/// One stored record.
///
/// Serialized shape (camelCase, epoch milliseconds):
/// `{ "value": …, "createdAt": …, "expiresAt": …, "encrypted": …, "version": 1 }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateEntry {
    /// The stored value.
    pub value: Value,
    /// When the entry was written, epoch milliseconds.
    pub created_at: i64,
    /// When the entry expires, epoch milliseconds. `None` means never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Whether the on-disk form passed through the configured cipher.
    pub encrypted: bool,
    /// On-disk format version.
    pub version: u32,
}

impl StateEntry {
    /// Build a fresh entry stamped with the current time.
    #[must_use]
    pub fn new(value: Value, ttl_millis: Option<i64>, encrypted: bool) -> Self {
        let created_at = now_millis();
        Self {
            value,
            created_at,
            expires_at: ttl_millis.map(|ttl| created_at.saturating_add(ttl)),
            encrypted,
            version: ENTRY_FORMAT_VERSION,
        }
    }

    /// Whether the entry has expired as of `now` (epoch milliseconds).
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}
