//! Position-triggered actions
//!
//! [`ActionTrack`] is the building block a concrete tween uses to implement
//! [`TweenTarget::run_actions`](crate::target::TweenTarget::run_actions). It
//! walks the raw window crossed by a move loop by loop, so every action
//! passed over fires exactly once, including across multi-loop jumps and
//! bounce turnarounds.

use crate::position::{Playback, NEVER_ADVANCED};
use crate::scheduler::{Scheduler, TimelineId};
use crate::target::ActionWindow;

/// Callback run when playback crosses an action's position
pub type ActionFn = Box<dyn FnMut(&mut Scheduler, TimelineId)>;

struct Action {
    /// Normalized position within a loop
    at: f64,
    run: ActionFn,
}

/// Actions ordered by position
#[derive(Default)]
pub struct ActionTrack {
    actions: Vec<Action>,
}

impl ActionTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` at normalized position `at`.
    ///
    /// Actions at the same position run in insertion order.
    pub fn add<F>(&mut self, at: f64, action: F)
    where
        F: FnMut(&mut Scheduler, TimelineId) + 'static,
    {
        let index = self.actions.partition_point(|a| a.at <= at);
        self.actions.insert(
            index,
            Action {
                at,
                run: Box::new(action),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run every action crossed by `window`.
    ///
    /// Returns `true` when an action moved or removed the timeline, in which
    /// case the remaining actions of the window are skipped.
    pub fn run(&mut self, cx: &mut Scheduler, id: TimelineId, window: &ActionWindow) -> bool {
        if self.actions.is_empty() {
            return false;
        }

        let playback = &window.playback;
        let duration = playback.duration;
        let first_advance = window.from_raw == NEVER_ADVANCED;

        let (loop0, t0) = if first_advance {
            (0, 0.0)
        } else {
            Self::saturate(playback, playback.decompose(window.from_raw))
        };
        let (loop1, t1) = Self::saturate(playback, playback.decompose(window.to_raw));

        if window.use_ticks {
            let landing = playback.directed(loop1, t1);
            return self.run_range(cx, id, landing, landing, false);
        }
        if loop0 == loop1 && t0 == t1 && !first_advance {
            return false;
        }

        let forward = first_advance || window.from_raw <= window.to_raw;
        let mut include_start = first_advance;
        let mut loop_index = loop0;
        loop {
            let mut start = if loop_index == loop0 {
                t0
            } else if forward {
                0.0
            } else {
                duration
            };
            let mut end = if loop_index == loop1 {
                t1
            } else if forward {
                duration
            } else {
                0.0
            };
            if playback.is_reversed(loop_index) {
                start = duration - start;
                end = duration - end;
            }

            // A bounce turnaround repeats the boundary the previous loop ended on
            let turnaround = playback.bounce && loop_index != loop0 && start == end;
            let wrapped = loop_index != loop0 && !playback.bounce;
            if !turnaround && self.run_range(cx, id, start, end, include_start || wrapped) {
                return true;
            }
            include_start = false;

            if forward {
                loop_index += 1;
                if loop_index > loop1 {
                    break;
                }
            } else {
                loop_index -= 1;
                if loop_index < loop1 {
                    break;
                }
            }
        }
        false
    }

    /// A completed raw position decomposes to the start of the loop after the
    /// last one; map it back to the end of the last loop.
    fn saturate(playback: &Playback, (loop_index, t): (i64, f64)) -> (i64, f64) {
        let last = i64::from(playback.loop_count);
        if playback.loop_count != -1 && loop_index > last {
            (last, playback.duration)
        } else {
            (loop_index, t)
        }
    }

    /// Run the actions strictly between `start` and `end`, plus those at
    /// `end` and, if requested, at `start`. Iterates in playback direction.
    fn run_range(
        &mut self,
        cx: &mut Scheduler,
        id: TimelineId,
        start: f64,
        end: f64,
        include_start: bool,
    ) -> bool {
        let backwards = start > end;
        let (lo, hi) = if backwards { (end, start) } else { (start, end) };
        let before = cx.position(id);

        let count = self.actions.len();
        for i in 0..count {
            let index = if backwards { count - 1 - i } else { i };
            let action = &mut self.actions[index];
            let at = action.at;
            if at == end || (at > lo && at < hi) || (include_start && at == start) {
                (action.run)(cx, id);
                if cx.position(id) != before {
                    tracing::trace!(?id, at, "action moved its timeline; skipping the rest");
                    return true;
                }
            }
        }
        false
    }
}
