//! In-process message bus for SnApps.
//!
//! Two layers over one channel registry: unidirectional pub/sub, and
//! request/response RPC with correlated request ids and timeouts.
//! The bus is in-process only; network transport is a host concern.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod bus;
pub mod error;
pub mod rpc;

pub use bus::{BusMessage, MessageBus, SubscriptionId};
pub use error::{BusError, BusResult};
pub use rpc::{DEFAULT_REQUEST_TIMEOUT, rpc_channel};
