//! The hook router.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use snapper_core::{HookEvent, HookPayload};

/// Stable registration handle for a hook handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandlerId(Uuid);

impl HookHandlerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Predicate deciding whether a handler observes a given payload.
pub type HookFilter = Box<dyn Fn(&HookPayload) -> bool + Send + Sync>;

/// A hook handler, synchronous or asynchronous.
///
/// Asynchronous callbacks are awaited to completion before the next
/// handler in priority order runs.
pub enum HookCallback {
    /// Runs inline during `emit`.
    Sync(Box<dyn Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync>),
    /// Returns a future that `emit` awaits before continuing.
    Async(Box<dyn Fn(HookPayload) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>),
}

impl HookCallback {
    /// Wrap a synchronous handler.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::Sync(Box::new(f))
    }

    /// Wrap an asynchronous handler.
    pub fn asynchronous<F, Fut>(f: F) -> Self
    where
        F: Fn(HookPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::Async(Box::new(move |payload| Box::pin(f(payload))))
    }
}

impl std::fmt::Debug for HookCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("HookCallback::Sync"),
            Self::Async(_) => f.write_str("HookCallback::Async"),
        }
    }
}

/// Subscription options for [`HookRouter::on`].
#[derive(Default)]
pub struct HookOptions {
    /// Dispatch priority; higher runs first. Default 0.
    pub priority: i32,
    /// Payload filter; handlers only observe payloads it accepts.
    pub filter: Option<HookFilter>,
}

impl HookOptions {
    /// Set the dispatch priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set a payload filter.
    #[must_use]
    pub fn with_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&HookPayload) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }
}

impl std::fmt::Debug for HookOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookOptions")
            .field("priority", &self.priority)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

struct HandlerEntry {
    id: HookHandlerId,
    priority: i32,
    once: bool,
    filter: Option<HookFilter>,
    callback: HookCallback,
}

/// Routes host lifecycle events to priority-ordered subscribers.
///
/// Within one `emit`, handlers run sequentially: each (including the
/// futures of asynchronous handlers) completes before the next begins.
/// Handler failures are logged and skipped; siblings still run.
#[derive(Default)]
pub struct HookRouter {
    handlers: RwLock<HashMap<HookEvent, Vec<Arc<HandlerEntry>>>>,
}

impl HookRouter {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to an event.
    ///
    /// Handlers are kept sorted by descending priority; insertion order
    /// breaks ties. Returns a stable id for [`off`](Self::off).
    pub fn on(&self, event: HookEvent, callback: HookCallback, options: HookOptions) -> HookHandlerId {
        self.insert(event, callback, options, false)
    }

    /// Subscribe a handler that removes itself after its first
    /// (filter-passing) invocation.
    pub fn once(&self, event: HookEvent, callback: HookCallback) -> HookHandlerId {
        self.insert(event, callback, HookOptions::default(), true)
    }

    fn insert(
        &self,
        event: HookEvent,
        callback: HookCallback,
        options: HookOptions,
        once: bool,
    ) -> HookHandlerId {
        let id = HookHandlerId::new();
        let entry = Arc::new(HandlerEntry {
            id,
            priority: options.priority,
            once,
            filter: options.filter,
            callback,
        });

        let mut handlers = self.handlers.write().expect("lock poisoned");
        let list = handlers.entry(event).or_default();
        list.push(entry);
        // Stable sort: equal priorities keep insertion order.
        list.sort_by(|a, b| b.priority.cmp(&a.priority));

        debug!(%event, priority = options.priority, once, "Hook handler registered");
        id
    }

    /// Remove a handler by id. Returns whether it was registered.
    pub fn off(&self, event: HookEvent, id: HookHandlerId) -> bool {
        let mut handlers = self.handlers.write().expect("lock poisoned");
        let Some(list) = handlers.get_mut(&event) else {
            return false;
        };
        let before = list.len();
        list.retain(|entry| entry.id != id);
        list.len() != before
    }

    /// Dispatch a payload to every matching handler of its event.
    ///
    /// Handlers run in priority order; a handler that fails is logged
    /// and the chain continues.
    pub async fn emit(&self, payload: HookPayload) {
        let event = payload.event();
        let snapshot: Vec<Arc<HandlerEntry>> = {
            let handlers = self.handlers.read().expect("lock poisoned");
            handlers.get(&event).cloned().unwrap_or_default()
        };
        if snapshot.is_empty() {
            trace!(%event, "No hook handlers");
            return;
        }

        let mut spent_once = Vec::new();
        for entry in &snapshot {
            if let Some(filter) = &entry.filter
                && !filter(&payload)
            {
                continue;
            }

            let result = match &entry.callback {
                HookCallback::Sync(f) => f(&payload),
                HookCallback::Async(f) => f(payload.clone()).await,
            };
            if let Err(e) = result {
                // One bad subscriber must not block the event chain.
                warn!(%event, handler_id = ?entry.id, error = %e, "Hook handler failed");
            }
            if entry.once {
                spent_once.push(entry.id);
            }
        }

        if !spent_once.is_empty() {
            let mut handlers = self.handlers.write().expect("lock poisoned");
            if let Some(list) = handlers.get_mut(&event) {
                list.retain(|entry| !spent_once.contains(&entry.id));
            }
        }
    }

    /// Remove every handler for one event, or all handlers when `None`.
    pub fn clear(&self, event: Option<HookEvent>) {
        let mut handlers = self.handlers.write().expect("lock poisoned");
        match event {
            Some(event) => {
                handlers.remove(&event);
            },
            None => handlers.clear(),
        }
    }

    /// Whether any handler is subscribed to the event.
    #[must_use]
    pub fn has_handlers(&self, event: HookEvent) -> bool {
        self.count(event) > 0
    }

    /// Number of handlers subscribed to the event.
    #[must_use]
    pub fn count(&self, event: HookEvent) -> usize {
        self.handlers
            .read()
            .expect("lock poisoned")
            .get(&event)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for HookRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.read().expect("lock poisoned");
        let total: usize = handlers.values().map(Vec::len).sum();
        f.debug_struct("HookRouter")
            .field("events", &handlers.len())
            .field("handlers", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn session_start(id: &str) -> HookPayload {
        HookPayload::SessionStart {
            session_id: id.into(),
        }
    }

    #[tokio::test]
    async fn test_priority_order_descending() {
        let router = HookRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for priority in [1, 3, 2] {
            let seen = Arc::clone(&seen);
            router.on(
                HookEvent::SessionStart,
                HookCallback::sync(move |_| {
                    seen.lock().unwrap().push(priority);
                    Ok(())
                }),
                HookOptions::default().with_priority(priority),
            );
        }

        router.emit(session_start("s")).await;
        assert_eq!(*seen.lock().unwrap(), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_equal_priority_keeps_insertion_order() {
        let router = HookRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            router.on(
                HookEvent::SessionEnd,
                HookCallback::sync(move |_| {
                    seen.lock().unwrap().push(label);
                    Ok(())
                }),
                HookOptions::default(),
            );
        }

        router
            .emit(HookPayload::SessionEnd {
                session_id: "s".into(),
            })
            .await;
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_filter_skips_non_matching_payloads() {
        let router = HookRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        router.on(
            HookEvent::SessionStart,
            HookCallback::sync(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            HookOptions::default().with_filter(|payload| payload.session_id() == "wanted"),
        );

        router.emit(session_start("other")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        router.emit(session_start("wanted")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_once_fires_exactly_once() {
        let router = HookRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        router.once(
            HookEvent::SessionStart,
            HookCallback::sync(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        assert_eq!(router.count(HookEvent::SessionStart), 1);

        router.emit(session_start("a")).await;
        router.emit(session_start("b")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(router.count(HookEvent::SessionStart), 0);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_block_siblings() {
        let router = HookRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        router.on(
            HookEvent::SessionStart,
            HookCallback::sync(|_| anyhow::bail!("boom")),
            HookOptions::default().with_priority(10),
        );
        router.on(
            HookEvent::SessionStart,
            HookCallback::sync(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            HookOptions::default(),
        );

        router.emit(session_start("s")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_handler_awaited_before_next() {
        let router = HookRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_slow = Arc::clone(&seen);
        router.on(
            HookEvent::SessionStart,
            HookCallback::asynchronous(move |_| {
                let seen = Arc::clone(&seen_slow);
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    seen.lock().unwrap().push("slow");
                    Ok(())
                }
            }),
            HookOptions::default().with_priority(5),
        );

        let seen_fast = Arc::clone(&seen);
        router.on(
            HookEvent::SessionStart,
            HookCallback::sync(move |_| {
                seen_fast.lock().unwrap().push("fast");
                Ok(())
            }),
            HookOptions::default(),
        );

        router.emit(session_start("s")).await;
        // The higher-priority async handler completes before the sync one runs.
        assert_eq!(*seen.lock().unwrap(), vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_off_unsubscribes() {
        let router = HookRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let id = router.on(
            HookEvent::SessionStart,
            HookCallback::sync(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            HookOptions::default(),
        );

        assert!(router.off(HookEvent::SessionStart, id));
        router.emit(session_start("s")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Removing twice reports false.
        assert!(!router.off(HookEvent::SessionStart, id));
    }

    #[tokio::test]
    async fn test_handlers_only_observe_their_event() {
        let router = HookRouter::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        router.on(
            HookEvent::SessionEnd,
            HookCallback::sync(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            HookOptions::default(),
        );

        router.emit(session_start("s")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_one_event_and_all() {
        let router = HookRouter::new();
        router.on(
            HookEvent::SessionStart,
            HookCallback::sync(|_| Ok(())),
            HookOptions::default(),
        );
        router.on(
            HookEvent::SessionEnd,
            HookCallback::sync(|_| Ok(())),
            HookOptions::default(),
        );

        router.clear(Some(HookEvent::SessionStart));
        assert!(!router.has_handlers(HookEvent::SessionStart));
        assert!(router.has_handlers(HookEvent::SessionEnd));

        router.clear(None);
        assert!(!router.has_handlers(HookEvent::SessionEnd));
    }

    #[tokio::test]
    async fn test_typed_payload_reaches_handler() {
        let router = HookRouter::new();
        let seen_tool = Arc::new(Mutex::new(String::new()));
        let seen_clone = Arc::clone(&seen_tool);

        router.on(
            HookEvent::BeforeTool,
            HookCallback::sync(move |payload| {
                if let HookPayload::BeforeTool { tool, args, .. } = payload {
                    *seen_clone.lock().unwrap() = format!("{tool}:{args}");
                }
                Ok(())
            }),
            HookOptions::default(),
        );

        router
            .emit(HookPayload::BeforeTool {
                session_id: "s".into(),
                tool: "read_file".into(),
                args: serde_json::json!({"path": "a.txt"}),
            })
            .await;
        assert_eq!(*seen_tool.lock().unwrap(), r#"read_file:{"path":"a.txt"}"#);
    }
}
