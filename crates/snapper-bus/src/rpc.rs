//! Named-method RPC over the bus.
//!
//! Handlers live in a two-level `app → method` table. A request publishes
//! its envelope `{ requestId, payload, sender }` on the reserved channel
//! `rpc:<app>:<method>` so observers see the traffic, but the response is
//! resolved directly through the table: the handler's return value
//! settles the caller's future, correlated by request id, with no
//! response-channel convention for handlers to learn.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::bus::{BusMessage, MessageBus};
use crate::error::{BusError, BusResult};

/// Default timeout for [`MessageBus::request`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// A registered RPC method handler. Receives the request payload and the
/// caller's id, if the caller identified itself.
pub(crate) type MethodHandler =
    Arc<dyn Fn(BusMessage, Option<String>) -> BoxFuture<'static, anyhow::Result<BusMessage>> + Send + Sync>;

/// The `app → method → handler` table.
#[derive(Default)]
pub(crate) struct MethodTable {
    apps: HashMap<String, HashMap<String, MethodHandler>>,
}

pub(crate) enum MethodLookup {
    Handler(MethodHandler),
    /// The app has methods, but not this one.
    UnknownMethod,
    /// The app has no registrations at all.
    UnknownApp,
}

impl MethodTable {
    fn insert(&mut self, snapp: &str, method: &str, handler: MethodHandler) {
        self.apps
            .entry(snapp.to_string())
            .or_default()
            .insert(method.to_string(), handler);
    }

    fn remove(&mut self, snapp: &str, method: &str) -> bool {
        let Some(methods) = self.apps.get_mut(snapp) else {
            return false;
        };
        let removed = methods.remove(method).is_some();
        if methods.is_empty() {
            self.apps.remove(snapp);
        }
        removed
    }

    fn lookup(&self, snapp: &str, method: &str) -> MethodLookup {
        match self.apps.get(snapp) {
            None => MethodLookup::UnknownApp,
            Some(methods) => match methods.get(method) {
                Some(handler) => MethodLookup::Handler(Arc::clone(handler)),
                None => MethodLookup::UnknownMethod,
            },
        }
    }

    pub(crate) fn clear(&mut self) {
        self.apps.clear();
    }
}

/// The reserved channel carrying request envelopes for one method.
#[must_use]
pub fn rpc_channel(snapp: &str, method: &str) -> String {
    format!("rpc:{snapp}:{method}")
}

impl MessageBus {
    /// Register an RPC method handler under `snapp.method`, replacing any
    /// previous handler for the pair.
    pub fn register_method<F, Fut>(&self, snapp: &str, method: &str, handler: F)
    where
        F: Fn(BusMessage, Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<BusMessage>> + Send + 'static,
    {
        let handler: MethodHandler =
            Arc::new(move |payload, sender| Box::pin(handler(payload, sender)));
        self.inner
            .methods
            .write()
            .expect("lock poisoned")
            .insert(snapp, method, handler);
        debug!(snapp, method, "RPC method registered");
    }

    /// Remove an RPC method handler. Returns whether it was registered.
    pub fn unregister_method(&self, snapp: &str, method: &str) -> bool {
        self.inner
            .methods
            .write()
            .expect("lock poisoned")
            .remove(snapp, method)
    }

    /// Call `target.method` with `payload`, waiting up to `timeout`
    /// (default 5000 ms) for the response.
    ///
    /// The request envelope is published on `rpc:<target>:<method>` for
    /// any observers before dispatch.
    ///
    /// # Errors
    ///
    /// - [`BusError::UnknownMethod`] when the target has methods
    ///   registered but not this one.
    /// - [`BusError::RequestTimeout`] when the handler does not respond
    ///   in time, or the target has no registrations (an absent peer).
    /// - [`BusError::MethodFailed`] when the handler returns an error.
    pub async fn request(
        &self,
        target: &str,
        method: &str,
        payload: BusMessage,
        sender: Option<&str>,
        timeout: Option<Duration>,
    ) -> BusResult<BusMessage> {
        let timeout = timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let request_id = Uuid::new_v4();

        let envelope = json!({
            "requestId": request_id.to_string(),
            "payload": payload,
            "sender": sender,
        });
        self.publish(&rpc_channel(target, method), &envelope, sender);

        let lookup = {
            let methods = self.inner.methods.read().expect("lock poisoned");
            methods.lookup(target, method)
        };

        let timeout_error = || BusError::RequestTimeout {
            snapp: target.to_string(),
            method: method.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };

        match lookup {
            MethodLookup::UnknownMethod => Err(BusError::UnknownMethod {
                snapp: target.to_string(),
                method: method.to_string(),
            }),
            MethodLookup::UnknownApp => {
                // Nobody can answer; behave like an unreachable peer.
                tokio::time::sleep(timeout).await;
                warn!(target, method, %request_id, "RPC request timed out");
                Err(timeout_error())
            },
            MethodLookup::Handler(handler) => {
                let sender = sender.map(str::to_string);
                match tokio::time::timeout(timeout, handler(payload, sender)).await {
                    Err(_) => {
                        warn!(target, method, %request_id, "RPC request timed out");
                        Err(timeout_error())
                    },
                    Ok(Err(cause)) => Err(BusError::MethodFailed {
                        snapp: target.to_string(),
                        method: method.to_string(),
                        cause,
                    }),
                    Ok(Ok(response)) => Ok(response),
                }
            },
        }
    }
}
