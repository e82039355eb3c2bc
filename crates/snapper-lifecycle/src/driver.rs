//! The lifecycle transition driver.

use tracing::{debug, info, warn};

use snapper_core::SnappState;
use snapper_registry::snapp::{RegisteredSnapp, SnappInstance};

use crate::error::{LifecycleError, LifecycleResult};
use crate::transition::is_valid_transition;

/// Drives SnApps through the lifecycle state machine.
///
/// The driver takes `&mut RegisteredSnapp`, so callers sequence
/// transitions; intermediate states (`loading`, `activating`, …) are
/// observable to concurrent readers, and starting a second operation on
/// the same app while one is in flight is a caller error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleDriver;

impl LifecycleDriver {
    /// Create a driver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Enter an operation's intermediate state, rejecting moves the
    /// transition table does not permit. The app is left untouched on
    /// rejection.
    fn begin(app: &mut RegisteredSnapp, to: SnappState) -> LifecycleResult<()> {
        let from = app.state();
        // Entering the state we are already in would mean a second
        // operation on an app mid-transition; reject that too.
        if from == to || !is_valid_transition(from, to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }
        app.set_state(to);
        Ok(())
    }

    /// Record a failure and park the app in the error state.
    fn fail(app: &mut RegisteredSnapp, reason: &impl std::fmt::Display) {
        warn!(snapp_id = %app.id(), error = %reason, "Lifecycle operation failed");
        app.record_error(reason.to_string());
        app.set_state(SnappState::Error);
    }

    /// Load a SnApp: `registered → loading → loaded`.
    ///
    /// `loader` performs the actual module load; `None` is a no-op load.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] if the app is not
    /// `registered`; [`LifecycleError::LoadFailure`] if the loader fails,
    /// in which case the app is left in the error state with the reason
    /// recorded.
    pub async fn load<F, Fut>(
        &self,
        app: &mut RegisteredSnapp,
        loader: Option<F>,
    ) -> LifecycleResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        Self::begin(app, SnappState::Loading)?;

        if let Some(loader) = loader
            && let Err(e) = loader().await
        {
            Self::fail(app, &e);
            return Err(LifecycleError::LoadFailure(e));
        }

        app.set_state(SnappState::Loaded);
        debug!(snapp_id = %app.id(), "Snapp loaded");
        Ok(())
    }

    /// Activate a SnApp: `{loaded, suspended} → activating → active`.
    ///
    /// The factory produces the instance; its `on_activate` callback, if
    /// present, runs before the app becomes `active`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] if the app is neither
    /// `loaded` nor `suspended`; [`LifecycleError::FactoryFailure`] or
    /// [`LifecycleError::CallbackFailure`] on factory/callback errors,
    /// both of which leave the app in the error state.
    pub async fn activate<F, Fut>(
        &self,
        app: &mut RegisteredSnapp,
        factory: F,
    ) -> LifecycleResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<SnappInstance>>,
    {
        Self::begin(app, SnappState::Activating)?;

        let instance = match factory().await {
            Ok(instance) => instance,
            Err(e) => {
                Self::fail(app, &e);
                return Err(LifecycleError::FactoryFailure(e));
            },
        };
        app.set_instance(instance);

        let pending = app
            .instance()
            .and_then(|instance| instance.on_activate.as_ref())
            .map(|callback| callback());
        if let Some(future) = pending
            && let Err(e) = future.await
        {
            Self::fail(app, &e);
            return Err(LifecycleError::CallbackFailure {
                callback: "on_activate",
                cause: e,
            });
        }

        app.set_state(SnappState::Active);
        info!(snapp_id = %app.id(), "Snapp activated");
        Ok(())
    }

    /// Suspend an active SnApp: `active → suspending → suspended`.
    ///
    /// Returns `false` without mutating when the app is not `active`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::PreconditionViolated`] if the app is `active`
    /// with no instance attached; [`LifecycleError::CallbackFailure`] if
    /// `on_suspend` fails (the app moves to the error state).
    pub async fn suspend(&self, app: &mut RegisteredSnapp) -> LifecycleResult<bool> {
        if app.state() != SnappState::Active {
            return Ok(false);
        }
        if !app.has_instance() {
            return Err(LifecycleError::PreconditionViolated {
                operation: "suspend",
                state: app.state(),
            });
        }
        Self::begin(app, SnappState::Suspending)?;

        let pending = app
            .instance()
            .and_then(|instance| instance.on_suspend.as_ref())
            .map(|callback| callback());
        if let Some(future) = pending
            && let Err(e) = future.await
        {
            Self::fail(app, &e);
            return Err(LifecycleError::CallbackFailure {
                callback: "on_suspend",
                cause: e,
            });
        }

        app.set_state(SnappState::Suspended);
        debug!(snapp_id = %app.id(), "Snapp suspended");
        Ok(true)
    }

    /// Unload a SnApp: `… → unloading → registered`.
    ///
    /// Returns `false` when the app is already `registered`. This is the
    /// only way out of the error state; on success the instance and any
    /// recorded error are cleared.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] if the app is mid-transition
    /// (`loading`, `activating`, `suspending`);
    /// [`LifecycleError::CallbackFailure`] if `on_destroy` fails (the app
    /// moves to the error state, instance retained).
    pub async fn unload(&self, app: &mut RegisteredSnapp) -> LifecycleResult<bool> {
        if app.state() == SnappState::Registered {
            return Ok(false);
        }
        Self::begin(app, SnappState::Unloading)?;

        let pending = app
            .instance()
            .and_then(|instance| instance.on_destroy.as_ref())
            .map(|callback| callback());
        if let Some(future) = pending
            && let Err(e) = future.await
        {
            Self::fail(app, &e);
            return Err(LifecycleError::CallbackFailure {
                callback: "on_destroy",
                cause: e,
            });
        }

        app.take_instance();
        app.clear_error();
        app.set_state(SnappState::Registered);
        info!(snapp_id = %app.id(), "Snapp unloaded");
        Ok(true)
    }
}
