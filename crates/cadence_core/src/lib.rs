//! Cadence Core
//!
//! Foundational primitives shared by the Cadence timing engine:
//!
//! - **Event Dispatch**: publish/subscribe notifications keyed by target and
//!   event type
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{event_types, Event, EventData, EventDispatcher};
//!
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.register(1, event_types::CHANGE, |event| {
//!     println!("changed: {:?}", event.data);
//! });
//!
//! let mut event = Event::new(event_types::CHANGE, 1, EventData::None);
//! dispatcher.dispatch(&mut event);
//! ```

pub mod events;

pub use events::{event_types, Event, EventData, EventDispatcher, EventHandler, EventType};
