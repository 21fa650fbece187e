//! Event dispatch system
//!
//! Publish/subscribe plumbing used to notify listeners about timeline changes.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    /// The timeline committed a new position
    pub const CHANGE: EventType = 1;
    /// The timeline reached the end of its final loop
    pub const COMPLETE: EventType = 2;
}

/// An event with associated data
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    /// Identifier of the emitting object (a timeline key in FFI form)
    pub target: u64,
    pub data: EventData,
    pub propagation_stopped: bool,
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    /// Playback state of a timeline at the moment the event was emitted
    Timeline {
        position: f64,
        raw_position: f64,
        complete: bool,
    },
    None,
}

impl Event {
    pub fn new(event_type: EventType, target: u64, data: EventData) -> Self {
        Self {
            event_type,
            target,
            data,
            propagation_stopped: false,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Event handler function type
pub type EventHandler = Box<dyn Fn(&Event) + Send + Sync>;

/// Dispatches events to registered handlers
pub struct EventDispatcher {
    handlers: FxHashMap<(u64, EventType), SmallVec<[EventHandler; 1]>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register an event handler for a target and event type
    pub fn register<F>(&mut self, target: u64, event_type: EventType, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register_boxed(target, event_type, Box::new(handler));
    }

    /// Register an already boxed handler
    pub fn register_boxed(&mut self, target: u64, event_type: EventType, handler: EventHandler) {
        self.handlers
            .entry((target, event_type))
            .or_default()
            .push(handler);
    }

    /// Drop every handler registered for `target`
    pub fn unregister_target(&mut self, target: u64) {
        self.handlers.retain(|(t, _), _| *t != target);
    }

    /// Whether anything listens for `event_type` on `target`
    pub fn has_handlers(&self, target: u64, event_type: EventType) -> bool {
        self.handlers
            .get(&(target, event_type))
            .is_some_and(|h| !h.is_empty())
    }

    /// Dispatch an event to all registered handlers
    pub fn dispatch(&self, event: &mut Event) {
        if let Some(handlers) = self.handlers.get(&(event.target, event.event_type)) {
            for handler in handlers {
                if event.propagation_stopped {
                    break;
                }
                handler(event);
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_dispatch_reaches_matching_handlers_only() {
        let mut dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        dispatcher.register(7, event_types::CHANGE, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let h = hits.clone();
        dispatcher.register(7, event_types::COMPLETE, move |_| {
            h.fetch_add(100, Ordering::SeqCst);
        });

        let mut event = Event::new(event_types::CHANGE, 7, EventData::None);
        dispatcher.dispatch(&mut event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let mut other = Event::new(event_types::CHANGE, 8, EventData::None);
        dispatcher.dispatch(&mut other);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_propagation() {
        let mut dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));

        dispatcher.register(1, event_types::CHANGE, |_| {});
        let h = hits.clone();
        dispatcher.register(1, event_types::CHANGE, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Event::new(event_types::CHANGE, 1, EventData::None);
        event.stop_propagation();
        dispatcher.dispatch(&mut event);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregister_target() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(3, event_types::CHANGE, |_| {});
        dispatcher.register(3, event_types::COMPLETE, |_| {});
        dispatcher.register(4, event_types::CHANGE, |_| {});

        dispatcher.unregister_target(3);

        assert!(!dispatcher.has_handlers(3, event_types::CHANGE));
        assert!(!dispatcher.has_handlers(3, event_types::COMPLETE));
        assert!(dispatcher.has_handlers(4, event_types::CHANGE));
    }
}
