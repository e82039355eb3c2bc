//! SnApp discovery.
//!
//! Scans configured directories for first-level children containing a
//! `snap.json` manifest. A directory that has a manifest but fails to
//! parse or read lands in the report's error list; missing directories
//! and children without a manifest are skipped silently.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::manifest::Manifest;

/// Default directory for built-in SnApps.
pub const DEFAULT_BUILTIN_DIR: &str = "./snapps";

/// Name of the manifest file inside each SnApp directory.
const MANIFEST_FILE: &str = "snap.json";

/// A discovery failure tied to one SnApp directory.
#[derive(Debug, Clone)]
pub struct DiscoveryFailure {
    /// The SnApp directory whose manifest failed.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

/// The outcome of a discovery scan.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Manifests that parsed and validated.
    pub manifests: Vec<Manifest>,
    /// Directories whose `snap.json` could not be read or validated.
    pub errors: Vec<DiscoveryFailure>,
}

/// Scans directories for SnApp manifests.
#[derive(Debug, Clone)]
pub struct SnappDiscovery {
    dirs: Vec<PathBuf>,
}

impl SnappDiscovery {
    /// Create a discovery scanner over the given built-in directory.
    #[must_use]
    pub fn new(builtin_dir: impl Into<PathBuf>) -> Self {
        Self {
            dirs: vec![builtin_dir.into()],
        }
    }

    /// Add an additional directory to scan.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// Scan all configured directories.
    ///
    /// Never fails as a whole: per-directory problems are accumulated in
    /// the report.
    pub async fn discover(&self) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        for dir in &self.dirs {
            self.scan_dir(dir, &mut report).await;
        }
        debug!(
            manifests = report.manifests.len(),
            errors = report.errors.len(),
            "Discovery complete"
        );
        report
    }

    async fn scan_dir(&self, dir: &Path, report: &mut DiscoveryReport) {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(_) => {
                // Missing or unreadable scan roots are not an error.
                debug!(dir = %dir.display(), "Skipping unreadable snapp directory");
                return;
            },
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }

            let snapp_dir = entry.path();
            let manifest_path = snapp_dir.join(MANIFEST_FILE);
            let text = match tokio::fs::read_to_string(&manifest_path).await {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    report.errors.push(DiscoveryFailure {
                        path: snapp_dir,
                        message: format!("failed to read {MANIFEST_FILE}: {e}"),
                    });
                    continue;
                },
            };

            match Manifest::from_json_str(&text) {
                Ok((manifest, warnings)) => {
                    for warning in &warnings {
                        warn!(snapp_id = %manifest.id, %warning, "Manifest warning");
                    }
                    debug!(snapp_id = %manifest.id, dir = %snapp_dir.display(), "Discovered snapp");
                    report.manifests.push(manifest);
                },
                Err(e) => {
                    report.errors.push(DiscoveryFailure {
                        path: snapp_dir,
                        message: e.to_string(),
                    });
                },
            }
        }
    }
}

impl Default for SnappDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_BUILTIN_DIR)
    }
}
