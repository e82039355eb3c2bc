//! SnApp manifest types and validation.
//!
//! A manifest (`snap.json`) describes a SnApp's identity, entry point,
//! requested capabilities, and host requirements. Manifests are loaded
//! from disk during discovery and validated on registration.
//!
//! Validation distinguishes hard errors (missing required fields, bad id,
//! bad version, permissions not a sequence) from warnings (unknown
//! permission tags, over-long short names). Warnings never reject a
//! manifest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use snapper_core::{ManifestVersion, Permission, SnappId};

use crate::error::{RegistryError, RegistryResult};

/// Maximum length for `shortName` before a warning is raised.
const SHORT_NAME_LIMIT: usize = 5;

/// A SnApp manifest loaded from `snap.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Unique SnApp identifier.
    pub id: SnappId,
    /// Human-readable display name.
    pub name: String,
    /// Path to the factory module, relative to the SnApp directory.
    pub entry: String,
    /// Requested capability tags. Unknown tags are kept verbatim and
    /// reported as warnings; only tags from the closed set are grantable.
    pub permissions: Vec<String>,
    /// Abbreviated name for narrow UI (≤ 5 characters, warn if longer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Semantic version string (`major.minor.patch` with optional tail).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional icon reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Optional author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Optional configuration schema and defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ManifestConfig>,
    /// Host requirements.
    pub openclaw: OpenclawRequirements,
}

/// Configuration block of a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig {
    /// JSON Schema for the SnApp's configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Default configuration values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,
}

/// Host requirements declared under the `openclaw` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenclawRequirements {
    /// Minimum host version this SnApp supports.
    pub min_version: String,
    /// Hook events the SnApp intends to subscribe to (advisory).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<String>,
}

/// A non-fatal finding from manifest validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestWarning {
    /// A permission tag outside the closed set.
    UnknownPermission(String),
    /// `shortName` is longer than the display limit.
    ShortNameTooLong {
        /// The offending short name.
        short_name: String,
        /// Its character length.
        length: usize,
    },
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPermission(tag) => write!(f, "unknown permission: {tag}"),
            Self::ShortNameTooLong { short_name, length } => write!(
                f,
                "shortName '{short_name}' is {length} characters (limit {SHORT_NAME_LIMIT})"
            ),
        }
    }
}

impl Manifest {
    /// Parse and validate a manifest from raw JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidManifest`] naming the first field
    /// that breaks a hard validation rule, or a parse error for text that
    /// is not a JSON object.
    pub fn from_json_str(text: &str) -> RegistryResult<(Self, Vec<ManifestWarning>)> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RegistryError::invalid("(root)", format!("not valid JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Validate a parsed JSON value and build a typed manifest.
    ///
    /// Hard rules (rejecting): `id`, `name`, `entry`, `permissions`, and
    /// `openclaw.minVersion` must be present with the right shapes; `id`
    /// must be kebab-case; `version`, if present, must begin with a
    /// `major.minor.patch` triple. Soft rules (warning only): permission
    /// tags outside the closed set and `shortName` longer than five
    /// characters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidManifest`] for any hard-rule breach.
    pub fn from_value(value: &Value) -> RegistryResult<(Self, Vec<ManifestWarning>)> {
        let obj = value
            .as_object()
            .ok_or_else(|| RegistryError::invalid("(root)", "manifest must be a JSON object"))?;

        let id_str = require_str(obj, "id")?;
        let id = SnappId::new(id_str).map_err(|e| RegistryError::invalid("id", e.to_string()))?;
        let name = require_str(obj, "name")?.to_string();
        let entry = require_str(obj, "entry")?.to_string();

        let mut warnings = Vec::new();

        let permissions_value = obj
            .get("permissions")
            .ok_or_else(|| RegistryError::missing("permissions"))?;
        let permission_items = permissions_value
            .as_array()
            .ok_or_else(|| RegistryError::invalid("permissions", "must be a sequence"))?;
        let mut permissions = Vec::with_capacity(permission_items.len());
        for item in permission_items {
            match item.as_str() {
                Some(tag) => permissions.push(tag.to_string()),
                // Keep a rendering of the odd value so the warning names it.
                None => permissions.push(item.to_string()),
            }
        }

        let openclaw_value = obj
            .get("openclaw")
            .ok_or_else(|| RegistryError::missing("openclaw"))?;
        let openclaw_obj = openclaw_value
            .as_object()
            .ok_or_else(|| RegistryError::invalid("openclaw", "must be an object"))?;
        let min_version = openclaw_obj
            .get("minVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| RegistryError::missing("openclaw.minVersion"))?
            .to_string();
        let hooks = openclaw_obj
            .get("hooks")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = match obj.get("config") {
            Some(v) => Some(
                serde_json::from_value::<ManifestConfig>(v.clone())
                    .map_err(|e| RegistryError::invalid("config", e.to_string()))?,
            ),
            None => None,
        };

        let manifest = Self {
            id,
            name,
            entry,
            permissions,
            short_name: optional_str(obj, "shortName"),
            version: optional_str(obj, "version"),
            description: optional_str(obj, "description"),
            icon: optional_str(obj, "icon"),
            author: optional_str(obj, "author"),
            config,
            openclaw: OpenclawRequirements { min_version, hooks },
        };

        warnings.extend(manifest.validate()?);
        Ok((manifest, warnings))
    }

    /// Re-run the rules that apply to an already-typed manifest.
    ///
    /// Used by the registry on `register`, where callers may hand over a
    /// manifest constructed in code rather than parsed from disk.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidManifest`] if `version` does not
    /// begin with a `major.minor.patch` triple.
    pub fn validate(&self) -> RegistryResult<Vec<ManifestWarning>> {
        if let Some(version) = &self.version {
            ManifestVersion::parse(version)
                .map_err(|e| RegistryError::invalid("version", e.to_string()))?;
        }

        let mut warnings = Vec::new();
        for tag in &self.permissions {
            if Permission::from_str(tag).is_err() {
                warnings.push(ManifestWarning::UnknownPermission(tag.clone()));
            }
        }
        if let Some(short_name) = &self.short_name {
            let length = short_name.chars().count();
            if length > SHORT_NAME_LIMIT {
                warnings.push(ManifestWarning::ShortNameTooLong {
                    short_name: short_name.clone(),
                    length,
                });
            }
        }
        Ok(warnings)
    }

    /// The subset of requested permissions that are grantable (in the
    /// closed set). Unknown tags are dropped here; they have already been
    /// surfaced as warnings during validation.
    #[must_use]
    pub fn granted_permissions(&self) -> Vec<Permission> {
        self.permissions
            .iter()
            .filter_map(|tag| Permission::from_str(tag).ok())
            .collect()
    }
}

fn require_str<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &str,
) -> RegistryResult<&'a str> {
    match obj.get(field) {
        None => Err(RegistryError::missing(field)),
        Some(v) => v
            .as_str()
            .ok_or_else(|| RegistryError::invalid(field, "must be a string")),
    }
}

fn optional_str(obj: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "id": "todo-list",
            "name": "Todo List",
            "entry": "./index",
            "permissions": ["storage:read", "storage:write"],
            "openclaw": { "minVersion": "2.0.0" }
        })
    }

    #[test]
    fn test_minimal_manifest_validates() {
        let (manifest, warnings) = Manifest::from_value(&minimal()).unwrap();
        assert_eq!(manifest.id.as_str(), "todo-list");
        assert_eq!(manifest.entry, "./index");
        assert_eq!(manifest.openclaw.min_version, "2.0.0");
        assert!(warnings.is_empty());
        assert_eq!(
            manifest.granted_permissions(),
            vec![Permission::StorageRead, Permission::StorageWrite]
        );
    }

    #[test]
    fn test_missing_required_fields_name_the_field() {
        for field in ["id", "name", "entry", "permissions", "openclaw"] {
            let mut value = minimal();
            value.as_object_mut().unwrap().remove(field);
            let err = Manifest::from_value(&value).unwrap_err();
            match err {
                RegistryError::InvalidManifest { field: f, message } => {
                    assert_eq!(f, field);
                    assert!(message.contains(field), "message should name {field}");
                },
                other => panic!("expected InvalidManifest, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_min_version() {
        let mut value = minimal();
        value["openclaw"] = json!({});
        let err = Manifest::from_value(&value).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidManifest { ref field, .. } if field == "openclaw.minVersion"
        ));
    }

    #[test]
    fn test_invalid_id_rejected() {
        let mut value = minimal();
        value["id"] = json!("Bad_Id");
        let err = Manifest::from_value(&value).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidManifest { ref field, .. } if field == "id"
        ));
    }

    #[test]
    fn test_permissions_must_be_sequence() {
        let mut value = minimal();
        value["permissions"] = json!("storage:read");
        let err = Manifest::from_value(&value).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidManifest { ref field, ref message }
                if field == "permissions" && message.contains("sequence")
        ));
    }

    #[test]
    fn test_unknown_permission_warns_but_passes() {
        let mut value = minimal();
        value["permissions"] = json!(["storage:read", "quantum:entangle"]);
        let (manifest, warnings) = Manifest::from_value(&value).unwrap();
        assert_eq!(
            warnings,
            vec![ManifestWarning::UnknownPermission("quantum:entangle".into())]
        );
        // The unknown tag is kept verbatim but never granted.
        assert!(manifest.permissions.contains(&"quantum:entangle".to_string()));
        assert_eq!(manifest.granted_permissions(), vec![Permission::StorageRead]);
    }

    #[test]
    fn test_version_must_begin_with_triple() {
        let mut value = minimal();
        value["version"] = json!("next");
        let err = Manifest::from_value(&value).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidManifest { ref field, .. } if field == "version"
        ));

        value["version"] = json!("1.4.2-beta.1");
        assert!(Manifest::from_value(&value).is_ok());
    }

    #[test]
    fn test_short_name_warns_over_five_chars() {
        let mut value = minimal();
        value["shortName"] = json!("todos!");
        let (manifest, warnings) = Manifest::from_value(&value).unwrap();
        assert_eq!(manifest.short_name.as_deref(), Some("todos!"));
        assert!(matches!(
            warnings[0],
            ManifestWarning::ShortNameTooLong { length: 6, .. }
        ));

        value["shortName"] = json!("todos");
        let (_, warnings) = Manifest::from_value(&value).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_optional_fields_parsed() {
        let mut value = minimal();
        value["description"] = json!("Tracks todos");
        value["author"] = json!("OpenClaw");
        value["icon"] = json!("list");
        value["openclaw"]["hooks"] = json!(["session_start", "before_tool"]);
        value["config"] = json!({
            "schema": { "type": "object" },
            "defaults": { "limit": 10 }
        });

        let (manifest, _) = Manifest::from_value(&value).unwrap();
        assert_eq!(manifest.description.as_deref(), Some("Tracks todos"));
        assert_eq!(manifest.openclaw.hooks, vec!["session_start", "before_tool"]);
        let config = manifest.config.unwrap();
        assert!(config.schema.is_some());
        assert_eq!(config.defaults.unwrap()["limit"], 10);
    }

    #[test]
    fn test_from_json_str_rejects_non_json() {
        assert!(Manifest::from_json_str("not json").is_err());
    }

    #[test]
    fn test_serde_round_trip_camel_case() {
        let (manifest, _) = Manifest::from_value(&minimal()).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"minVersion\""));
        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, manifest.id);
        assert_eq!(parsed.openclaw.min_version, manifest.openclaw.min_version);
    }
}
