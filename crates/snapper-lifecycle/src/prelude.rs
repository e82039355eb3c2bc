//! Convenience re-exports for downstream crates.

pub use crate::driver::LifecycleDriver;
pub use crate::error::{LifecycleError, LifecycleResult};
pub use snapper_core::SnappState;
