//! Channel pub/sub.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::rpc::MethodTable;

/// Messages on the bus are arbitrary JSON values.
pub type BusMessage = serde_json::Value;

/// A channel subscription handler. Receives the message and the sender's
/// id, if the publisher identified itself.
pub(crate) type BusHandler = Arc<dyn Fn(&BusMessage, Option<&str>) -> anyhow::Result<()> + Send + Sync>;

/// Stable handle for one channel subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

struct Subscription {
    id: SubscriptionId,
    subscriber: Option<String>,
    once: bool,
    handler: BusHandler,
}

pub(crate) struct BusInner {
    pub(crate) channels: RwLock<HashMap<String, Vec<Subscription>>>,
    pub(crate) methods: RwLock<MethodTable>,
}

/// The in-process message bus.
///
/// Cheap to clone: clones share the channel registry and method table.
#[derive(Clone)]
pub struct MessageBus {
    pub(crate) inner: Arc<BusInner>,
}

impl MessageBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                channels: RwLock::new(HashMap::new()),
                methods: RwLock::new(MethodTable::default()),
            }),
        }
    }

    /// Subscribe a handler to a channel.
    ///
    /// `subscriber` names the subscribing app for diagnostics. Returns a
    /// handle for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, channel: &str, subscriber: Option<&str>, handler: F) -> SubscriptionId
    where
        F: Fn(&BusMessage, Option<&str>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(channel, subscriber, false, Arc::new(handler))
    }

    /// Subscribe a handler that is removed after its first delivery.
    pub fn subscribe_once<F>(
        &self,
        channel: &str,
        subscriber: Option<&str>,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&BusMessage, Option<&str>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(channel, subscriber, true, Arc::new(handler))
    }

    fn insert(
        &self,
        channel: &str,
        subscriber: Option<&str>,
        once: bool,
        handler: BusHandler,
    ) -> SubscriptionId {
        let id = SubscriptionId::new();
        let mut channels = self.inner.channels.write().expect("lock poisoned");
        channels
            .entry(channel.to_string())
            .or_default()
            .push(Subscription {
                id,
                subscriber: subscriber.map(str::to_string),
                once,
                handler,
            });
        debug!(channel, subscriber, once, "Bus subscription added");
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        let mut channels = self.inner.channels.write().expect("lock poisoned");
        let Some(subscriptions) = channels.get_mut(channel) else {
            return false;
        };
        let before = subscriptions.len();
        subscriptions.retain(|sub| sub.id != id);
        let removed = subscriptions.len() != before;
        if subscriptions.is_empty() {
            channels.remove(channel);
        }
        removed
    }

    /// Deliver a message to every subscriber of the channel, in
    /// subscription order. Handler errors are logged and swallowed so one
    /// bad subscriber cannot block the rest. Returns the number of
    /// subscribers invoked.
    pub fn publish(&self, channel: &str, message: &BusMessage, sender: Option<&str>) -> usize {
        let snapshot: Vec<(SubscriptionId, Option<String>, bool, BusHandler)> = {
            let channels = self.inner.channels.read().expect("lock poisoned");
            channels
                .get(channel)
                .map(|subs| {
                    subs.iter()
                        .map(|sub| {
                            (
                                sub.id,
                                sub.subscriber.clone(),
                                sub.once,
                                Arc::clone(&sub.handler),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        if snapshot.is_empty() {
            trace!(channel, "No subscribers");
            return 0;
        }

        let mut spent_once = Vec::new();
        for (id, subscriber, once, handler) in &snapshot {
            if let Err(e) = handler(message, sender) {
                warn!(
                    channel,
                    subscriber = subscriber.as_deref(),
                    error = %e,
                    "Bus subscriber failed"
                );
            }
            if *once {
                spent_once.push(*id);
            }
        }

        if !spent_once.is_empty() {
            let mut channels = self.inner.channels.write().expect("lock poisoned");
            if let Some(subscriptions) = channels.get_mut(channel) {
                subscriptions.retain(|sub| !spent_once.contains(&sub.id));
                if subscriptions.is_empty() {
                    channels.remove(channel);
                }
            }
        }

        trace!(channel, delivered = snapshot.len(), "Message published");
        snapshot.len()
    }

    /// Number of current subscribers on a channel.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.inner
            .channels
            .read()
            .expect("lock poisoned")
            .get(channel)
            .map_or(0, Vec::len)
    }

    /// Drop all subscriptions and method registrations.
    pub fn clear(&self) {
        self.inner.channels.write().expect("lock poisoned").clear();
        self.inner.methods.write().expect("lock poisoned").clear();
        debug!("Bus cleared");
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels = self.inner.channels.read().expect("lock poisoned");
        f.debug_struct("MessageBus")
            .field("channels", &channels.len())
            .field(
                "subscriptions",
                &channels.values().map(Vec::len).sum::<usize>(),
            )
            .finish_non_exhaustive()
    }
}
