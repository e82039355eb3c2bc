//! Registered SnApp records and instance capability objects.

use std::fmt;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use snapper_core::{SnappId, SnappState};

use crate::manifest::Manifest;

/// An app-supplied lifecycle callback.
///
/// Callbacks are stored boxed so the instance record stays an ordinary
/// value; the driver awaits the returned future before continuing.
pub type LifecycleCallback = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// The capability record a SnApp factory returns on activation.
///
/// Each entry is optional; the lifecycle driver tests presence before
/// invoking. The core treats these as opaque.
#[derive(Default)]
pub struct SnappInstance {
    /// Invoked after the activating transition, before `active`.
    pub on_activate: Option<LifecycleCallback>,
    /// Invoked during suspension, before `suspended`.
    pub on_suspend: Option<LifecycleCallback>,
    /// Invoked during unload, before the record returns to `registered`.
    pub on_destroy: Option<LifecycleCallback>,
}

impl SnappInstance {
    /// Create an instance with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the activation callback.
    #[must_use]
    pub fn with_on_activate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_activate = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Set the suspension callback.
    #[must_use]
    pub fn with_on_suspend<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_suspend = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Set the teardown callback.
    #[must_use]
    pub fn with_on_destroy<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_destroy = Some(Box::new(move || Box::pin(f())));
        self
    }
}

impl fmt::Debug for SnappInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnappInstance")
            .field("on_activate", &self.on_activate.is_some())
            .field("on_suspend", &self.on_suspend.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

/// A catalogued SnApp: manifest plus lifecycle bookkeeping.
///
/// The registry creates and destroys these records; the lifecycle driver
/// owns the `state`, `instance`, and `error` fields and mutates them
/// through the methods below. Invariants: `state == Error` implies an
/// error message is recorded; `state` in `{Active, Suspending, Suspended}`
/// implies an instance is present.
pub struct RegisteredSnapp {
    manifest: Manifest,
    state: SnappState,
    instance: Option<SnappInstance>,
    error: Option<String>,
    registered_at: DateTime<Utc>,
    state_changed_at: DateTime<Utc>,
}

impl RegisteredSnapp {
    /// Create a freshly registered record in the `Registered` state.
    #[must_use]
    pub fn new(manifest: Manifest) -> Self {
        let now = Utc::now();
        Self {
            manifest,
            state: SnappState::Registered,
            instance: None,
            error: None,
            registered_at: now,
            state_changed_at: now,
        }
    }

    /// The SnApp's identifier.
    #[must_use]
    pub fn id(&self) -> &SnappId {
        &self.manifest.id
    }

    /// The immutable manifest.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SnappState {
        self.state
    }

    /// The recorded failure reason, if the SnApp is in the error state.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The live instance, if the SnApp has been activated.
    #[must_use]
    pub fn instance(&self) -> Option<&SnappInstance> {
        self.instance.as_ref()
    }

    /// Whether an instance is present.
    #[must_use]
    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    /// When the record was created.
    #[must_use]
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// When the state last changed.
    #[must_use]
    pub fn state_changed_at(&self) -> DateTime<Utc> {
        self.state_changed_at
    }

    /// Move to a new state and stamp the change time.
    ///
    /// Transition validity is the lifecycle driver's responsibility; this
    /// method only records the move.
    pub fn set_state(&mut self, state: SnappState) {
        self.state = state;
        self.state_changed_at = Utc::now();
    }

    /// Attach the instance produced by the factory.
    pub fn set_instance(&mut self, instance: SnappInstance) {
        self.instance = Some(instance);
    }

    /// Detach and return the instance, if any.
    pub fn take_instance(&mut self) -> Option<SnappInstance> {
        self.instance.take()
    }

    /// Record a failure reason.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Clear the recorded failure reason.
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

impl fmt::Debug for RegisteredSnapp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredSnapp")
            .field("id", self.id())
            .field("state", &self.state)
            .field("has_instance", &self.instance.is_some())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
