//! Synchronous ingestion notifications.
//!
//! The engine publishes a notification after each request or error is
//! recorded so a host can forward them (push gateways, live dashboards)
//! without polling. Observers are explicit callback registrations invoked
//! synchronously on the ingesting thread: publish must stay cheap, since a
//! slow observer delays ingestion.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::RwLock;
use tracing::debug;

use crate::types::{ErrorSample, RequestSample};

/// A notification emitted after ingestion.
///
/// Samples are shared via `Arc` so fan-out does not copy payloads.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A request was recorded.
    RequestObserved(Arc<RequestSample>),
    /// An error was recorded.
    ErrorObserved(Arc<ErrorSample>),
}

/// Handle identifying a registered observer, used to unsubscribe.
pub type ObserverId = u64;

type Callback = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

/// Registry of ingestion observers.
///
/// Callbacks are invoked in registration order. The registry lock is not
/// held during callback invocation, so an observer may subscribe or
/// unsubscribe others from within its callback.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<Vec<(ObserverId, Callback)>>,
    next_id: AtomicU64,
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback, returning the id needed to unsubscribe it.
    pub fn subscribe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.write().push((id, Arc::new(callback)));
        debug!(observer_id = id, "observer subscribed");
        id
    }

    /// Removes a previously registered callback.
    ///
    /// Returns `false` if the id is unknown or already unsubscribed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Invokes every registered callback with the event, synchronously.
    pub fn notify(&self, event: &EngineEvent) {
        // Clone the handles out so the lock is not held across callbacks.
        let callbacks: Vec<Callback> =
            self.observers.read().iter().map(|(_, cb)| Arc::clone(cb)).collect();

        for callback in callbacks {
            callback(event);
        }
    }
}
