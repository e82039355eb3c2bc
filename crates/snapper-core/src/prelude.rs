//! Convenience re-exports for downstream crates.

pub use crate::hook_event::{HookEvent, HookPayload};
pub use crate::permission::Permission;
pub use crate::snapp_id::SnappId;
pub use crate::snapp_state::SnappState;
pub use crate::time::now_millis;
pub use crate::version::ManifestVersion;
