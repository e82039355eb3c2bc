//! Hook router: typed host lifecycle events fanned out to SnApps.
//!
//! Handlers are ordered by descending priority (stable for equals),
//! optionally filtered per payload, and isolated from each other — a
//! failing handler never blocks its siblings.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod router;

pub use router::{HookCallback, HookFilter, HookHandlerId, HookOptions, HookRouter};
