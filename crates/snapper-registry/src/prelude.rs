//! Convenience re-exports for downstream crates.

pub use crate::discovery::{DiscoveryReport, SnappDiscovery};
pub use crate::error::{RegistryError, RegistryResult};
pub use crate::manifest::{Manifest, ManifestWarning};
pub use crate::registry::SnappRegistry;
pub use crate::snapp::{RegisteredSnapp, SnappInstance};
