//! SnApp registry: manifest validation, discovery, and the catalog.
//!
//! The registry is the only component that inspects manifest contents.
//! Everything downstream (lifecycle driver, API façade) trusts a manifest
//! the registry has accepted.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod discovery;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod snapp;

pub use discovery::{DEFAULT_BUILTIN_DIR, DiscoveryFailure, DiscoveryReport, SnappDiscovery};
pub use error::{RegistryError, RegistryResult};
pub use manifest::{Manifest, ManifestConfig, ManifestWarning, OpenclawRequirements};
pub use registry::SnappRegistry;
pub use snapp::{LifecycleCallback, RegisteredSnapp, SnappInstance};
