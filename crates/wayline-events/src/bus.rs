//! Named-event publish/subscribe registry.
//!
//! The bus maps event names to ordered handler lists. Unrelated parts of an
//! application can react to each other's events without being wired together
//! directly.

use dashmap::DashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// A registered event handler.
///
/// Handlers are compared by `Arc` pointer identity: registering a clone of
/// the same `Arc` twice is a no-op, and unsubscribing requires the same
/// `Arc`.
pub type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// A publish/subscribe registry for named events.
///
/// Delivery is synchronous and in registration order. A handler that panics
/// is logged and skipped; later handlers still run.
pub struct EventBus<P> {
    /// Handler lists indexed by event name.
    handlers: DashMap<String, Vec<Handler<P>>>,
}

impl<P> EventBus<P> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Register a handler for an event.
    ///
    /// Returns `false` (and changes nothing) if the same handler is already
    /// registered for that event. The event's handler list is created
    /// lazily.
    pub fn subscribe(&self, event: impl Into<String>, handler: Handler<P>) -> bool {
        let event = event.into();
        let mut list = self.handlers.entry(event.clone()).or_default();

        if list.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            trace!(event = %event, "Handler already subscribed");
            return false;
        }

        list.push(handler);
        debug!(event = %event, handlers = list.len(), "Handler subscribed");
        true
    }

    /// Remove a handler from an event.
    ///
    /// Returns `true` if the handler was registered. When the last handler
    /// for an event is removed, the event entry is removed entirely so the
    /// registry does not accumulate stale empty lists.
    pub fn unsubscribe(&self, event: &str, handler: &Handler<P>) -> bool {
        let Some(mut list) = self.handlers.get_mut(event) else {
            return false;
        };

        let Some(index) = list.iter().position(|h| Arc::ptr_eq(h, handler)) else {
            return false;
        };

        list.remove(index);
        let emptied = list.is_empty();
        drop(list);

        if emptied {
            self.handlers.remove(event);
            debug!(event = %event, "Removed empty event entry");
        } else {
            debug!(event = %event, "Handler unsubscribed");
        }

        true
    }

    /// Publish a payload to every handler registered for an event.
    ///
    /// Handlers run synchronously, in registration order. The list is
    /// snapshotted first, so handlers that mutate the bus mid-delivery do
    /// not affect this delivery. Returns the number of handlers invoked;
    /// 0 if the event has none.
    pub fn publish(&self, event: &str, payload: &P) -> usize {
        let snapshot: Vec<Handler<P>> = match self.handlers.get(event) {
            Some(list) => list.clone(),
            None => return 0,
        };

        trace!(event = %event, handlers = snapshot.len(), "Publishing event");

        for handler in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(payload))).is_err() {
                error!(event = %event, "Event handler panicked");
            }
        }

        snapshot.len()
    }

    /// Drop every registered handler (process-wide reset).
    pub fn clear(&self) {
        self.handlers.clear();
        debug!("Event bus cleared");
    }

    /// Check whether an event has any handlers.
    #[must_use]
    pub fn has_event(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Number of handlers registered for an event.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map(|l| l.len()).unwrap_or(0)
    }

    /// Number of events with at least one handler.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.handlers.len()
    }

    /// Names of all events with at least one handler.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.handlers.iter().map(|e| e.key().clone()).collect()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.event_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn counting_handler(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> Handler<u32> {
        let log = Arc::clone(log);
        Arc::new(move |_| log.lock().unwrap().push(label))
    }

    #[test]
    fn test_subscribe_dedupes_same_handler() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = counting_handler(&log, "a");

        assert!(bus.subscribe("nav", Arc::clone(&handler)));
        assert!(!bus.subscribe("nav", Arc::clone(&handler)));
        assert_eq!(bus.handler_count("nav"), 1);

        bus.publish("nav", &1);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_publish_in_registration_order() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe("nav", counting_handler(&log, "first"));
        bus.subscribe("nav", counting_handler(&log, "second"));
        bus.subscribe("nav", counting_handler(&log, "third"));

        assert_eq!(bus.publish("nav", &7), 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_publish_without_handlers_is_noop() {
        let bus: EventBus<u32> = EventBus::new();
        assert_eq!(bus.publish("missing", &0), 0);
    }

    #[test]
    fn test_unsubscribe_removes_empty_event_entry() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = counting_handler(&log, "a");
        let b = counting_handler(&log, "b");

        bus.subscribe("nav", Arc::clone(&a));
        bus.subscribe("nav", Arc::clone(&b));

        assert!(bus.unsubscribe("nav", &a));
        assert!(bus.has_event("nav"));

        assert!(bus.unsubscribe("nav", &b));
        assert!(!bus.has_event("nav"));
        assert_eq!(bus.event_count(), 0);

        // Unsubscribing again is a no-op
        assert!(!bus.unsubscribe("nav", &a));
    }

    #[test]
    fn test_panicking_handler_does_not_stop_delivery() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let panicking: Handler<u32> = Arc::new(|_| panic!("boom"));
        bus.subscribe("nav", panicking);
        bus.subscribe("nav", counting_handler(&log, "survivor"));

        assert_eq!(bus.publish("nav", &1), 2);
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[test]
    fn test_clear_empties_registry() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe("a", counting_handler(&log, "a"));
        bus.subscribe("b", counting_handler(&log, "b"));
        assert_eq!(bus.event_count(), 2);

        bus.clear();
        assert!(bus.is_empty());
        assert_eq!(bus.publish("a", &1), 0);
    }

    #[test]
    fn test_handlers_snapshotted_during_publish() {
        let bus: Arc<EventBus<u32>> = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let bus_inner = Arc::clone(&bus);
        let log_inner = Arc::clone(&log);
        bus.subscribe(
            "nav",
            Arc::new(move |_: &u32| {
                log_inner.lock().unwrap().push("original");
                // Registered mid-delivery; must not run for this publish.
                let log_late = Arc::clone(&log_inner);
                let late: Handler<u32> = Arc::new(move |_| {
                    log_late.lock().unwrap().push("late");
                });
                bus_inner.subscribe("nav", late);
            }),
        );

        assert_eq!(bus.publish("nav", &1), 1);
        assert_eq!(*log.lock().unwrap(), vec!["original"]);
        assert_eq!(bus.handler_count("nav"), 2);
    }
}
