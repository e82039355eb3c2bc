//! SnApp identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a SnApp identifier string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid snapp id: {0}")]
pub struct SnappIdError(pub String);

/// Unique, stable, human-readable SnApp identifier.
///
/// SnApp IDs are kebab-case strings like `"todo-list"` or `"git-status"`:
/// one or more lowercase alphanumeric segments joined by single hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SnappId(String);

/// Deserialize with validation — rejects malformed IDs (e.g. path traversal
/// payloads in crafted manifests).
impl<'de> Deserialize<'de> for SnappId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl SnappId {
    /// Create a new `SnappId`, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`SnappIdError`] if the ID is empty, contains characters
    /// outside `[a-z0-9-]`, or has a leading, trailing, or doubled hyphen.
    pub fn new(id: impl Into<String>) -> Result<Self, SnappIdError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a `SnappId` without validation (for tests and internal use).
    #[must_use]
    pub fn from_static(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a string is a valid SnApp ID without constructing one.
    #[must_use]
    pub fn is_valid_id(id: &str) -> bool {
        Self::validate(id).is_ok()
    }

    /// Validate that a SnApp ID string is well-formed.
    ///
    /// Equivalent to the pattern `^[a-z0-9]+(-[a-z0-9]+)*$`.
    fn validate(id: &str) -> Result<(), SnappIdError> {
        if id.is_empty() {
            return Err(SnappIdError("snapp id must not be empty".into()));
        }
        let segments_ok = id.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        if !segments_ok {
            return Err(SnappIdError(format!(
                "snapp id must be kebab-case (lowercase alphanumeric segments joined by single hyphens), got: {id}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SnappId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SnappId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
