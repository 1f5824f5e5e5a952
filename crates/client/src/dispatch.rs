//! Typed event fan-out.
//!
//! A registry of handlers keyed by [`EventKind`]. Many handlers may be
//! registered per kind; each is invoked at most once per received envelope,
//! in no guaranteed order, and in isolation: one panicking handler never
//! prevents the rest from running.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use tracing::error;
use uuid::Uuid;

use veristream_shared::{EventKind, ServerEvent};

type Handler = Arc<dyn Fn(&ServerEvent) + Send + Sync>;

struct RegisteredHandler {
    id: Uuid,
    handler: Handler,
}

#[derive(Default)]
struct RegistryInner {
    handlers: HashMap<EventKind, Vec<RegisteredHandler>>,
}

/// Per-event-kind subscriber registry.
#[derive(Clone, Default)]
pub struct EventRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    ///
    /// Registering the same closure twice creates two independent
    /// registrations. The returned [`Subscription`] unregisters on
    /// [`Subscription::unsubscribe`] or on drop.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl Fn(&ServerEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = Uuid::new_v4();
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .handlers
                .entry(kind)
                .or_default()
                .push(RegisteredHandler {
                    id,
                    handler: Arc::new(handler),
                });
        }
        Subscription {
            kind,
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every handler registered for the event's kind.
    ///
    /// Handlers are cloned out of the lock before invocation, so a handler
    /// may itself subscribe or unsubscribe without deadlocking.
    pub fn dispatch(&self, event: &ServerEvent) {
        let handlers: Vec<Handler> = {
            let Ok(inner) = self.inner.lock() else {
                return;
            };
            inner
                .handlers
                .get(&event.kind())
                .map(|list| list.iter().map(|r| r.handler.clone()).collect())
                .unwrap_or_default()
        };

        for handler in handlers {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                error!(kind = ?event.kind(), "event handler panicked; continuing fan-out");
            }
        }
    }

    /// Number of live registrations for a kind.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.handlers.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

/// Handle to one registration.
///
/// Dropping the handle unregisters it; call [`Subscription::detach`] to
/// keep the handler alive for the registry's lifetime instead.
pub struct Subscription {
    kind: EventKind,
    id: Uuid,
    registry: Weak<Mutex<RegistryInner>>,
}

impl Subscription {
    /// Remove this registration. Idempotent: calling it twice, or after the
    /// registry has been torn down, is a no-op.
    pub fn unsubscribe(&self) {
        let Some(inner) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut inner) = inner.lock() else {
            return;
        };
        if let Some(list) = inner.handlers.get_mut(&self.kind) {
            list.retain(|r| r.id != self.id);
            if list.is_empty() {
                inner.handlers.remove(&self.kind);
            }
        }
    }

    /// Keep the registration alive without holding the handle.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
