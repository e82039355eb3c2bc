//! The per-SnApp API façade.
//!
//! Each activation constructs one [`SnappApi`] bound to a single app's
//! identity and granted permissions. The façade is the app's only view of
//! the core: state calls delegate to the state store, hook subscriptions
//! to the router, messaging to the bus, and every gated operation checks
//! the app's capability tags first. The façade owns no durable state of
//! its own.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod commands;
pub mod error;
pub mod facade;
pub mod logger;
pub mod surface;

pub use commands::{CommandArgs, CommandContext, CommandOutput, ProgressTracker};
pub use error::{ApiError, ApiResult};
pub use facade::{API_VERSION, CoreServices, SnappApi, VersionInfo};
pub use logger::SnappLogger;
pub use surface::{
    PanelDefinition, PanelEvent, PanelOptions, TabDefinition, TabEvent, TabEventKind, TabOptions,
    TabUpdate, ToastKind, ToastOptions,
};
