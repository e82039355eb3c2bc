//! Manifest version parsing.
//!
//! Manifests may carry a semantic version. The validator requires a
//! leading `major.minor.patch` triple; a prerelease or build tail
//! (`-beta.1`, `+build5`) is preserved verbatim but not interpreted.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing a manifest version string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    /// The string does not start with a `major.minor.patch` triple.
    #[error("invalid version format: {0} (expected major.minor.patch with optional tail)")]
    InvalidFormat(String),
    /// A numeric segment could not be parsed.
    #[error("invalid version number: {0}")]
    InvalidNumber(#[from] ParseIntError),
}

/// A manifest version: a semver triple plus an optional uninterpreted tail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestVersion {
    /// Major version - breaking changes.
    pub major: u32,
    /// Minor version - new features, backwards compatible.
    pub minor: u32,
    /// Patch version - bug fixes, backwards compatible.
    pub patch: u32,
    /// Prerelease/build tail including its leading `-` or `+`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<String>,
}

impl ManifestVersion {
    /// Create a plain `major.minor.patch` version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            tail: None,
        }
    }

    /// Parse a version from a string like `"1.2.3"` or `"1.2.3-beta+5"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not begin with three
    /// dot-separated numeric segments, or if a tail is present that does
    /// not start with `-` or `+`.
    pub fn parse(s: &str) -> Result<Self, VersionParseError> {
        s.parse()
    }
}

impl fmt::Display for ManifestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(tail) = &self.tail {
            f.write_str(tail)?;
        }
        Ok(())
    }
}

impl FromStr for ManifestVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Split off the tail at the first '-' or '+' after the triple.
        let core_end = trimmed
            .find(|c: char| c == '-' || c == '+')
            .unwrap_or(trimmed.len());
        let (core, tail) = trimmed.split_at(core_end);

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(VersionParseError::InvalidFormat(s.to_string()));
        }
        Ok(Self {
            major: parts[0].parse()?,
            minor: parts[1].parse()?,
            patch: parts[2].parse()?,
            tail: if tail.is_empty() {
                None
            } else {
                Some(tail.to_string())
            },
        })
    }
}
