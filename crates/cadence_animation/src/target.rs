//! Collaborator interface
//!
//! A concrete tween plugs into the timing engine by implementing
//! [`TweenTarget`]. Hooks get the scheduler back so they can seek, pause or
//! remove timelines (including their own) while a move is in progress.

use crate::position::Playback;
use crate::scheduler::{Scheduler, TimelineId};

/// Raw-position window crossed by one committed move
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionWindow {
    /// Raw position before the move, -1 on the first advance
    pub from_raw: f64,
    /// Raw position after the move
    pub to_raw: f64,
    /// The move finished the final loop
    pub end: bool,
    /// The landing loop plays backwards
    pub reversed: bool,
    /// Only the action at the landing position should run
    pub use_ticks: bool,
    /// Loop and direction settings of the timeline at the time of the move
    pub playback: Playback,
}

/// Hooks the timing engine calls on the tween it drives
pub trait TweenTarget {
    /// Apply interpolated values at normalized position `t`.
    ///
    /// Returning `true` suppresses action execution for this move.
    fn apply_position(&mut self, cx: &mut Scheduler, id: TimelineId, t: f64, end: bool) -> bool;

    /// Run actions scheduled within `window`, each at most once.
    fn run_actions(&mut self, cx: &mut Scheduler, id: TimelineId, window: &ActionWindow) {
        let _ = (cx, id, window);
    }
}
