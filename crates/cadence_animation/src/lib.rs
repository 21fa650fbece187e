//! Cadence Animation Timing
//!
//! The timing engine under a tween: position normalization, playback control
//! and the registry of active timelines.
//!
//! # Features
//!
//! - **Normalization**: loop, reverse and bounce folded into one position
//! - **Saturating completion**: finite timelines settle on their end value
//! - **Active registry**: O(1) pause/resume, safe to mutate mid-tick
//! - **Actions**: position-triggered callbacks that never double-fire
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{Scheduler, TimelineConfig};
//!
//! let mut scheduler = Scheduler::new();
//! let id = scheduler
//!     .timeline()
//!     .config(TimelineConfig::default().with_paused(false))
//!     .duration(1000.0)
//!     .spawn(&mut scheduler);
//!
//! scheduler.tick(500.0, false);
//! assert_eq!(scheduler.position(id), Some(500.0));
//!
//! scheduler.tick(600.0, false);
//! assert!(scheduler.get(id).unwrap().is_complete());
//! assert!(!scheduler.has_active());
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod position;
pub mod scheduler;
pub mod target;
pub mod timeline;

pub use actions::{ActionFn, ActionTrack};
pub use config::{LoopSetting, TimelineConfig};
pub use error::{Result, TimelineError};
pub use position::{normalize, Normalized, Playback, Step};
pub use scheduler::{Scheduler, TimelineId};
pub use target::{ActionWindow, TweenTarget};
pub use timeline::{PlaybackState, Timeline, TimelineBuilder};
