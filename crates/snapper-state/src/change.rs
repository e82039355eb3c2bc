//! Change notification plumbing.

use std::sync::RwLock;

use tracing::warn;
use uuid::Uuid;

use snapper_core::SnappId;

/// Emitted to change listeners when a synchronized persist completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The namespace that changed.
    pub namespace: String,
    /// The key that changed.
    pub key: String,
    /// The SnApp that performed the write.
    pub snapp_id: SnappId,
}

/// Registration handle for a change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeListenerId(Uuid);

impl ChangeListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

type ChangeHandler = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// An owned list of change handlers with register/unregister semantics.
#[derive(Default)]
pub(crate) struct ChangeListeners {
    handlers: RwLock<Vec<(ChangeListenerId, ChangeHandler)>>,
}

impl ChangeListeners {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, handler: ChangeHandler) -> ChangeListenerId {
        let id = ChangeListenerId::new();
        self.handlers.write().expect("lock poisoned").push((id, handler));
        id
    }

    pub(crate) fn unregister(&self, id: ChangeListenerId) -> bool {
        let mut handlers = self.handlers.write().expect("lock poisoned");
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Deliver an event to every listener. A panicking listener is
    /// isolated so siblings still observe the change.
    pub(crate) fn notify(&self, event: &ChangeEvent) {
        let handlers = self.handlers.read().expect("lock poisoned");
        for (id, handler) in handlers.iter() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(event);
            }));
            if result.is_err() {
                warn!(listener_id = ?id, "Change listener panicked");
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.read().expect("lock poisoned").len()
    }
}
