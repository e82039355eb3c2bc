//! SnApp lifecycle: the state machine and its transition driver.
//!
//! States move `registered → loading → loaded → activating → active`,
//! with suspension (`active ↔ suspended`) and teardown
//! (`… → unloading → registered`). The error state is recoverable only
//! via unload; the driver never retries on its own.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod driver;
pub mod error;
pub mod transition;

pub use driver::LifecycleDriver;
pub use error::{LifecycleError, LifecycleResult};
pub use transition::is_valid_transition;
