//! Convenience re-exports for hosts embedding the façade.

pub use crate::commands::{CommandArgs, CommandContext, CommandOutput};
pub use crate::error::{ApiError, ApiResult};
pub use crate::facade::{CoreServices, SnappApi};
pub use crate::logger::SnappLogger;
pub use crate::surface::{TabOptions, ToastOptions};
pub use snapper_core::Permission;
