//! Convenience re-exports for downstream crates.

pub use crate::bus::{BusMessage, MessageBus, SubscriptionId};
pub use crate::error::{BusError, BusResult};
pub use crate::rpc::DEFAULT_REQUEST_TIMEOUT;
