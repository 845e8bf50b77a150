//! Debounced event notification channel

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::event::{ClipEvent, EventKind};

/// How long a pending notification waits before it is dispatched.
///
/// Every [`EventBus::trigger`] call restarts this window; only the most
/// recent call survives a burst.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

type Handler = Arc<dyn Fn(&ClipEvent) + Send + Sync>;

/// Opaque handle returned by [`EventBus::on`] / [`EventBus::once`],
/// used to remove one specific handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Subscription {
    id: HandlerId,
    kind: EventKind,
    handler: Handler,
    once: bool,
}

#[derive(Default)]
struct BusState {
    /// All subscriptions across all channels, in registration order
    handlers: Vec<Subscription>,
    /// The single pending notification, shared across channels
    pending: Option<ClipEvent>,
    /// Bumped on every trigger; a flush task whose generation no longer
    /// matches was superseded and does nothing
    generation: u64,
    next_id: u64,
}

/// Publish/subscribe channel for clipboard notifications, keyed by
/// [`EventKind`], with debounced delivery.
///
/// Delivery policy, guaranteed rather than incidental: triggers are
/// debounced globally across *all* channels through one shared pending
/// slot. Within any burst of triggers spaced closer than
/// [`DEBOUNCE_WINDOW`], only the final trigger's event is delivered, once,
/// to its own channel's handlers; earlier events in the burst are
/// dropped, including events on other channels. Clipboard bindings can
/// fire several near-simultaneous mechanism reports for one user action;
/// this coalesces them into the one that matters.
///
/// Handlers run in registration order. A panicking handler is isolated so
/// the rest of the dispatch still runs. Nothing is ever delivered
/// synchronously from `trigger`.
///
/// `trigger` schedules its flush on the Tokio timer and must be called
/// from within a runtime.
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        // Handlers run outside the lock, so a poisoned state only means a
        // panic elsewhere mid-update; the data is still coherent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, kind: EventKind, handler: Handler, once: bool) -> HandlerId {
        let mut state = self.state();
        state.next_id += 1;
        let id = HandlerId(state.next_id);
        state.handlers.push(Subscription {
            id,
            kind,
            handler,
            once,
        });
        id
    }

    /// Register a handler for one channel
    pub fn on(
        &self,
        kind: EventKind,
        handler: impl Fn(&ClipEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        self.subscribe(kind, Arc::new(handler), false)
    }

    /// Register a handler that auto-unsubscribes after its first invocation
    pub fn once(
        &self,
        kind: EventKind,
        handler: impl Fn(&ClipEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        self.subscribe(kind, Arc::new(handler), true)
    }

    /// Remove every handler on every channel.
    ///
    /// A pending dispatch whose window has not yet elapsed finds no
    /// handlers when it fires, so clearing subscriptions also suppresses
    /// in-flight notifications.
    pub fn off_all(&self) {
        self.state().handlers.clear();
    }

    /// Remove every handler on one channel
    pub fn off(&self, kind: &EventKind) {
        self.state().handlers.retain(|s| s.kind != *kind);
    }

    /// Remove one handler by its id
    pub fn unsubscribe(&self, id: HandlerId) {
        self.state().handlers.retain(|s| s.id != id);
    }

    /// Schedule `event` for delivery on its kind's channel after the
    /// debounce window, replacing any not-yet-dispatched event.
    pub fn trigger(&self, event: ClipEvent) {
        let generation = {
            let mut state = self.state();
            state.pending = Some(event);
            state.generation += 1;
            state.generation
        };

        let bus = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_WINDOW).await;
            bus.flush(generation);
        });
    }

    fn flush(&self, generation: u64) {
        let (event, handlers) = {
            let mut state = self.state();
            if state.generation != generation {
                // A newer trigger restarted the window
                return;
            }
            let Some(event) = state.pending.take() else {
                return;
            };
            let kind = event.kind().clone();
            let handlers: Vec<Handler> = state
                .handlers
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| Arc::clone(&s.handler))
                .collect();
            state.handlers.retain(|s| !(s.once && s.kind == kind));
            (event, handlers)
        };

        // Invoked outside the lock: handlers may subscribe, unsubscribe or
        // trigger reentrantly.
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                log::warn!("event handler panicked during '{}' dispatch", event.kind());
            }
        }
    }
}
