//! Convenience re-exports for downstream crates.

pub use crate::router::{HookCallback, HookHandlerId, HookOptions, HookRouter};
pub use snapper_core::{HookEvent, HookPayload};
