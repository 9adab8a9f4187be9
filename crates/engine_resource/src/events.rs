//! Resource change notifications.
//!
//! [`ResourceEvents`] is a publish/subscribe channel for
//! [`ResourceEvent`]s. Subscribing returns a [`Subscription`] guard; dropping
//! the guard removes the handler, so every acquire is paired with exactly
//! one release on every exit path.
//!
//! Events may be published from any thread. Handlers are invoked on the
//! publishing thread, outside the channel's internal lock, so a handler may
//! take its own locks without risking lock-order inversion against
//! subscribe/unsubscribe.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::trace;

/// What happened to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceEventKind {
    /// New content was stored under the resource id.
    ContentUpdated,
    /// The content is about to be unloaded.
    ContentUnloading,
}

/// A single resource notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEvent {
    /// What happened.
    pub kind: ResourceEventKind,
    /// [`Resource::KIND`](crate::Resource::KIND) of the affected resource.
    pub resource_kind: &'static str,
    /// Id of the affected resource.
    pub resource_id: String,
}

type Handler = Arc<dyn Fn(&ResourceEvent) + Send + Sync>;

struct EventsInner {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, Handler)>>,
}

impl EventsInner {
    fn remove(&self, id: u64) {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        handlers.retain(|(handler_id, _)| *handler_id != id);
    }
}

/// A cloneable handle to one resource event channel.
#[derive(Clone)]
pub struct ResourceEvents {
    inner: Arc<EventsInner>,
}

impl ResourceEvents {
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EventsInner {
                next_id: AtomicU64::new(1),
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register `handler` until the returned guard is dropped.
    #[must_use = "dropping the subscription removes the handler immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ResourceEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        trace!(subscription = id, "resource event handler added");
        Subscription {
            id,
            events: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every handler registered at the time of the call.
    pub fn publish(&self, event: &ResourceEvent) {
        let handlers: Vec<Handler> = self
            .inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        trace!(
            kind = ?event.kind,
            resource_kind = event.resource_kind,
            resource_id = %event.resource_id,
            handlers = handlers.len(),
            "publishing resource event"
        );

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for ResourceEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceEvents")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// Keeps a handler registered. Dropping it unregisters the handler.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    events: Weak<EventsInner>,
}

impl Subscription {
    /// Unregister now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.events.upgrade() {
            inner.remove(self.id);
            trace!(subscription = self.id, "resource event handler removed");
        }
    }
}
