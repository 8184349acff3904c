//! Event bus - synchronous fan-out of events to registered listeners

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::events::{panic_message, AppEvent, EventDraft};

type Listener = Arc<dyn Fn(&AppEvent) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    /// Registrations in subscription order
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
    closed: bool,
}

/// Publish/subscribe channel shared by the components of one session.
///
/// Cloning gives another handle on the same listener set.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

/// Handle returned by `EventBus::subscribe`
#[must_use = "dropping the subscription handle leaves the listener registered forever"]
pub struct Subscription {
    bus: Weak<Mutex<BusInner>>,
    id: u64,
}

impl Subscription {
    /// Remove the registration. Repeated calls do nothing.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Every call is an independent registration.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        if !inner.closed {
            inner.listeners.push((id, Arc::new(listener)));
        }
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Complete the draft and deliver it to every current listener, in
    /// registration order. Returns the delivered event.
    ///
    /// A panicking listener is reported and skipped; the rest still run.
    pub fn emit(&self, draft: EventDraft) -> AppEvent {
        let event = AppEvent {
            id: draft.id.unwrap_or_else(new_event_id),
            timestamp: draft
                .timestamp
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
            scope: draft.scope,
            level: draft.level,
            message: draft.message,
            data: draft.data,
        };

        // Snapshot so listeners may (un)subscribe or emit while we deliver
        let listeners: Vec<(u64, Listener)> = self.inner.lock().listeners.clone();

        for (id, listener) in listeners {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                tracing::error!(
                    listener = id,
                    event = %event.id,
                    panic = panic_message(&*payload),
                    "Event listener panicked"
                );
            }
        }

        event
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Drop every listener. Later emits reach nobody and later subscriptions
    /// are inert.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.listeners.clear();
        tracing::debug!("Event bus shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().closed
    }
}

fn new_event_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
