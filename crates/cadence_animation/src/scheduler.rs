//! Timeline scheduler
//!
//! Owns every timeline, drives their position changes and keeps the active
//! registry: an intrusive doubly linked list of unpaused timelines that the
//! frame driver walks once per tick.

use cadence_core::{event_types, Event, EventData, EventDispatcher, EventHandler, EventType};
use slotmap::{new_key_type, Key, SlotMap};

use crate::error::{Result, TimelineError};
use crate::position::{normalize, Normalized, Step};
use crate::target::ActionWindow;
use crate::timeline::{Timeline, TimelineBuilder};

new_key_type! {
    /// Handle to a timeline owned by a [`Scheduler`]
    pub struct TimelineId;
}

/// Owner of a timing domain: the timelines, their listeners and the active
/// registry.
pub struct Scheduler {
    timelines: SlotMap<TimelineId, Timeline>,
    /// First member of the active registry
    head: Option<TimelineId>,
    active_count: usize,
    /// Next member to visit in the running `for_each_active` walk
    iter_cursor: Option<TimelineId>,
    dispatcher: EventDispatcher,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            timelines: SlotMap::with_key(),
            head: None,
            active_count: 0,
            iter_cursor: None,
            dispatcher: EventDispatcher::new(),
        }
    }

    /// Start building a timeline for this scheduler
    pub fn timeline(&self) -> TimelineBuilder {
        Timeline::builder()
    }

    pub(crate) fn insert(&mut self, timeline: Timeline) -> TimelineId {
        self.timelines.insert(timeline)
    }

    /// Remove a timeline, unlinking it and dropping its listeners.
    ///
    /// A timeline removed from inside its own hooks keeps its target until
    /// the hooks return, then the target is dropped.
    pub fn remove(&mut self, id: TimelineId) -> Option<Timeline> {
        self.unlink(id);
        self.dispatcher.unregister_target(Self::event_target(id));
        let mut timeline = self.timelines.remove(id)?;
        timeline.paused = true;
        Some(timeline)
    }

    pub fn get(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(id)
    }

    /// Mutable access for configuration setters; registry state stays with
    /// the scheduler.
    pub fn get_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        self.timelines.get_mut(id)
    }

    pub fn contains(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(id)
    }

    /// Number of timelines owned, active or not
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Iterate over all timelines
    pub fn iter(&self) -> impl Iterator<Item = (TimelineId, &Timeline)> {
        self.timelines.iter()
    }

    /// Position of `id`, if it still exists
    pub fn position(&self, id: TimelineId) -> Option<f64> {
        self.timelines.get(id).map(Timeline::position)
    }

    /// The `target` value carried by events emitted for `id`
    pub fn event_target(id: TimelineId) -> u64 {
        id.data().as_ffi()
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Subscribe to an event emitted by timeline `id`
    pub fn on<F>(&mut self, id: TimelineId, event_type: EventType, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.dispatcher
            .register(Self::event_target(id), event_type, handler);
    }

    pub(crate) fn on_boxed(
        &mut self,
        id: TimelineId,
        event_type: EventType,
        handler: EventHandler,
    ) {
        self.dispatcher
            .register_boxed(Self::event_target(id), event_type, handler);
    }

    fn emit(&self, id: TimelineId, event_type: EventType) {
        let Some(timeline) = self.timelines.get(id) else {
            return;
        };
        let mut event = Event::new(
            event_type,
            Self::event_target(id),
            EventData::Timeline {
                position: timeline.position,
                raw_position: timeline.raw_position,
                complete: timeline.complete,
            },
        );
        self.dispatcher.dispatch(&mut event);
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    /// Move `id` forward (or backward, for a negative `delta`) and run the
    /// actions crossed unless `ignore_actions` is set.
    ///
    /// Returns whether the timeline has completed.
    pub fn advance(&mut self, id: TimelineId, delta: f64, ignore_actions: bool) -> Result<bool> {
        let timeline = self.timelines.get(id).ok_or(TimelineError::UnknownTimeline(id))?;
        // An unadvanced timeline starts counting from zero
        let base = timeline.raw_position.max(0.0);
        self.set_position(id, base + delta, !ignore_actions)
    }

    /// Seek `id` to the raw position `raw_target`.
    ///
    /// Seeking to the position already committed is inert: no hooks run and
    /// no `change` event fires. Returns whether the timeline has completed.
    pub fn set_position(
        &mut self,
        id: TimelineId,
        raw_target: f64,
        run_actions: bool,
    ) -> Result<bool> {
        let timeline = self.timelines.get(id).ok_or(TimelineError::UnknownTimeline(id))?;

        match normalize(raw_target, &timeline.playback(), timeline.raw_position) {
            Normalized::Unchanged { complete } => Ok(complete),
            Normalized::Degenerate => {
                let settled = Step {
                    position: 0.0,
                    raw_position: 0.0,
                    loop_index: 0,
                    complete: true,
                    reversed: false,
                };
                self.commit(id, settled, false);
                Ok(true)
            }
            Normalized::Moved(step) => {
                self.commit(id, step, run_actions);
                Ok(step.complete)
            }
        }
    }

    /// Commit `step`, then run the target hooks, the completion pause and the
    /// notifications, in that order.
    fn commit(&mut self, id: TimelineId, step: Step, run_actions: bool) {
        let Some(timeline) = self.timelines.get_mut(id) else {
            return;
        };

        // State must be final before any hook can observe or re-enter it
        timeline.prev_raw_position = timeline.raw_position;
        timeline.position = step.position;
        timeline.raw_position = step.raw_position;
        timeline.complete = step.complete;

        let window = ActionWindow {
            from_raw: timeline.prev_raw_position,
            to_raw: step.raw_position,
            end: step.complete,
            reversed: step.reversed,
            use_ticks: timeline.use_ticks,
            playback: timeline.playback(),
        };

        let nested = timeline.in_hooks;
        if nested {
            tracing::trace!(?id, raw = step.raw_position, "re-entrant move; target hooks deferred");
        }
        let mut target = timeline.target.take();
        timeline.in_hooks = true;

        let blocked = match target.as_mut() {
            Some(target) => target.apply_position(self, id, step.position, step.complete),
            None => false,
        };

        if step.complete {
            tracing::debug!(?id, raw = step.raw_position, "timeline complete");
            self.pause_member(id);
        }

        if run_actions && !blocked {
            if let Some(target) = target.as_mut() {
                target.run_actions(self, id, &window);
            }
        }

        // A nested move skipped the hooks; bring the target up to date
        if let Some(target) = target.as_mut() {
            let moved = self
                .timelines
                .get(id)
                .filter(|t| t.raw_position != step.raw_position)
                .map(|t| (t.position, t.complete));
            if let Some((position, complete)) = moved {
                target.apply_position(self, id, position, complete);
            }
        }

        if !nested {
            if let Some(timeline) = self.timelines.get_mut(id) {
                timeline.target = target;
                timeline.in_hooks = false;
            }
        }

        self.emit(id, event_types::CHANGE);
        // A hook may have moved the timeline back off its end
        let still_complete = self.timelines.get(id).is_some_and(|t| t.complete);
        if step.complete && still_complete {
            self.emit(id, event_types::COMPLETE);
        }
    }

    /// Pause or resume `id`, keeping active registry membership in sync.
    /// Idempotent.
    pub fn set_paused(&mut self, id: TimelineId, paused: bool) -> Result<&mut Self> {
        let timeline = self
            .timelines
            .get_mut(id)
            .ok_or(TimelineError::UnknownTimeline(id))?;
        if timeline.paused != paused {
            timeline.paused = paused;
            if paused {
                self.unlink(id);
            } else {
                self.link(id);
            }
        }
        Ok(self)
    }

    pub(crate) fn activate(&mut self, id: TimelineId) {
        if let Some(timeline) = self.timelines.get_mut(id) {
            timeline.paused = false;
            self.link(id);
        }
    }

    fn pause_member(&mut self, id: TimelineId) {
        if let Some(timeline) = self.timelines.get_mut(id) {
            timeline.paused = true;
            self.unlink(id);
        }
    }

    /// Timelines cannot be duplicated by the timing engine
    pub fn try_clone(&self, id: TimelineId) -> Result<Timeline> {
        self.timelines
            .get(id)
            .ok_or(TimelineError::UnknownTimeline(id))?
            .try_clone()
    }

    // ========================================================================
    // Active registry
    // ========================================================================

    /// Advance every active timeline by `delta` (or by one step for tick
    /// timelines), running actions.
    ///
    /// While `globally_paused`, only timelines that ignore the global pause
    /// move.
    pub fn tick(&mut self, delta: f64, globally_paused: bool) {
        self.for_each_active(|cx, id| {
            let Some(timeline) = cx.timelines.get(id) else {
                return;
            };
            if timeline.paused || (globally_paused && !timeline.ignore_global_pause) {
                return;
            }
            let step = if timeline.use_ticks { 1.0 } else { delta };
            if let Err(err) = cx.advance(id, step, false) {
                tracing::warn!(?id, "tick failed: {}", err);
            }
        });
    }

    /// Visit every active timeline once.
    ///
    /// The successor is recorded before `f` runs, and unlinking that
    /// successor moves the record on to its own successor. `f` may therefore
    /// pause or remove the visited timeline and any number of other members.
    /// Members linked during the walk are prepended and not visited.
    pub fn for_each_active<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Scheduler, TimelineId),
    {
        // Nested walks keep their own cursor
        let outer = self.iter_cursor.take();
        let mut cursor = self.head;
        while let Some(id) = cursor {
            self.iter_cursor = self.next_of(id);
            f(self, id);
            cursor = self.iter_cursor;
        }
        self.iter_cursor = outer;
    }

    /// Snapshot of active timeline ids, head first
    pub fn active_ids(&self) -> Vec<TimelineId> {
        let mut ids = Vec::with_capacity(self.active_count);
        let mut cursor = self.head;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.next_of(id);
        }
        ids
    }

    pub fn has_active(&self) -> bool {
        self.head.is_some()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Pause every active timeline
    pub fn clear(&mut self) {
        let ids = self.active_ids();
        tracing::debug!(count = ids.len(), "pausing all active timelines");
        for id in ids {
            self.pause_member(id);
        }
    }

    fn next_of(&self, id: TimelineId) -> Option<TimelineId> {
        self.timelines.get(id).and_then(|t| t.links.next)
    }

    fn is_linked(&self, id: TimelineId) -> bool {
        self.head == Some(id) || self.timelines.get(id).is_some_and(|t| t.links.prev.is_some())
    }

    /// Prepend `id` to the registry
    fn link(&mut self, id: TimelineId) {
        if self.is_linked(id) || !self.timelines.contains_key(id) {
            return;
        }
        let old_head = self.head;
        if let Some(head) = old_head.and_then(|h| self.timelines.get_mut(h)) {
            head.links.prev = Some(id);
        }
        if let Some(timeline) = self.timelines.get_mut(id) {
            timeline.links.prev = None;
            timeline.links.next = old_head;
        }
        self.head = Some(id);
        self.active_count += 1;
        tracing::trace!(?id, active = self.active_count, "timeline linked");
    }

    /// Unlink `id` from the registry and clear its links
    fn unlink(&mut self, id: TimelineId) {
        if !self.is_linked(id) {
            return;
        }
        let Some(links) = self.timelines.get_mut(id).map(|t| std::mem::take(&mut t.links)) else {
            return;
        };
        match links.prev.and_then(|p| self.timelines.get_mut(p)) {
            Some(prev) => prev.links.next = links.next,
            None => self.head = links.next,
        }
        if let Some(next) = links.next.and_then(|n| self.timelines.get_mut(n)) {
            next.links.prev = links.prev;
        }
        if self.iter_cursor == Some(id) {
            self.iter_cursor = links.next;
        }
        self.active_count -= 1;
        tracing::trace!(?id, active = self.active_count, "timeline unlinked");
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
