//! The SnApp catalog.

use std::collections::HashMap;

use tracing::{info, warn};

use snapper_core::SnappId;

use crate::error::{RegistryError, RegistryResult};
use crate::manifest::Manifest;
use crate::snapp::RegisteredSnapp;

/// Registry of catalogued SnApps.
///
/// Keyed by `SnappId` with insertion order preserved, so `get_all`
/// reports apps in registration order.
pub struct SnappRegistry {
    entries: HashMap<SnappId, RegisteredSnapp>,
    order: Vec<SnappId>,
}

impl SnappRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Validate a manifest and catalog it as a freshly registered SnApp.
    ///
    /// Validation warnings (unknown permissions, long short names) are
    /// logged but do not reject.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the ID is already
    /// catalogued, or [`RegistryError::InvalidManifest`] for a hard
    /// validation failure.
    pub fn register(&mut self, manifest: Manifest) -> RegistryResult<()> {
        let warnings = manifest.validate()?;
        for warning in &warnings {
            warn!(snapp_id = %manifest.id, %warning, "Manifest warning");
        }

        if self.entries.contains_key(&manifest.id) {
            return Err(RegistryError::DuplicateId(manifest.id.clone()));
        }

        let id = manifest.id.clone();
        info!(snapp_id = %id, "Registered snapp");
        self.entries.insert(id.clone(), RegisteredSnapp::new(manifest));
        self.order.push(id);
        Ok(())
    }

    /// Remove a SnApp from the catalog, returning its record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no SnApp with the given ID
    /// exists.
    pub fn unregister(&mut self, id: &SnappId) -> RegistryResult<RegisteredSnapp> {
        let snapp = self
            .entries
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        self.order.retain(|entry| entry != id);
        info!(snapp_id = %id, "Unregistered snapp");
        Ok(snapp)
    }

    /// Get a reference to a catalogued SnApp.
    #[must_use]
    pub fn get(&self, id: &SnappId) -> Option<&RegisteredSnapp> {
        self.entries.get(id)
    }

    /// Get a mutable reference to a catalogued SnApp (for the lifecycle
    /// driver).
    #[must_use]
    pub fn get_mut(&mut self, id: &SnappId) -> Option<&mut RegisteredSnapp> {
        self.entries.get_mut(id)
    }

    /// Whether a SnApp with the given ID is catalogued.
    #[must_use]
    pub fn has(&self, id: &SnappId) -> bool {
        self.entries.contains_key(id)
    }

    /// All catalogued SnApps in registration order.
    #[must_use]
    pub fn get_all(&self) -> Vec<&RegisteredSnapp> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .collect()
    }

    /// Number of catalogued SnApps.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Drop every catalogued SnApp.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl Default for SnappRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnappRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnappRegistry")
            .field("count", &self.entries.len())
            .field("order", &self.order)
            .finish()
    }
}
