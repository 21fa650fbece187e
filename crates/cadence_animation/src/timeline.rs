//! Timeline state
//!
//! A [`Timeline`] holds the playback state of one tweened target. It lives
//! inside a [`Scheduler`], which owns the registry links and drives every
//! state transition.

use std::fmt;

use cadence_core::{event_types, Event, EventHandler};

use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::position::{Playback, NEVER_ADVANCED};
use crate::scheduler::{Scheduler, TimelineId};
use crate::target::TweenTarget;

/// Coarse playback state derived from a timeline's flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Unpaused and linked into the active registry
    Active,
    /// Paused before reaching the end
    Paused,
    /// Paused after finishing a finite run
    Completed,
}

/// Intrusive registry links, only touched by the scheduler
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Links {
    pub(crate) next: Option<TimelineId>,
    pub(crate) prev: Option<TimelineId>,
}

/// Playback state of a single timeline
pub struct Timeline {
    pub(crate) duration: f64,
    pub(crate) loop_count: i32,
    pub(crate) position: f64,
    pub(crate) raw_position: f64,
    pub(crate) prev_raw_position: f64,
    pub(crate) reversed: bool,
    pub(crate) bounce: bool,
    pub(crate) use_ticks: bool,
    pub(crate) ignore_global_pause: bool,
    pub(crate) paused: bool,
    pub(crate) complete: bool,
    pub(crate) links: Links,
    /// Taken out while its hooks run
    pub(crate) target: Option<Box<dyn TweenTarget>>,
    pub(crate) in_hooks: bool,
}

impl Timeline {
    /// Create a detached, paused timeline from `config`.
    ///
    /// The `paused` option is applied when the timeline is inserted into a
    /// scheduler.
    pub(crate) fn new(config: &TimelineConfig, duration: f64) -> Self {
        Self {
            duration,
            loop_count: config.loop_count(),
            position: 0.0,
            raw_position: NEVER_ADVANCED,
            prev_raw_position: NEVER_ADVANCED,
            reversed: config.reversed,
            bounce: config.bounce,
            use_ticks: config.use_ticks,
            ignore_global_pause: config.ignore_global_pause,
            paused: true,
            complete: false,
            links: Links::default(),
            target: None,
            in_hooks: false,
        }
    }

    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::new(TimelineConfig::default())
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Additional loops after the first, -1 for infinite
    pub fn loop_count(&self) -> i32 {
        self.loop_count
    }

    /// Normalized position in `[0, duration]`
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Cumulative position, -1 before the first advance
    pub fn raw_position(&self) -> f64 {
        self.raw_position
    }

    pub fn prev_raw_position(&self) -> f64 {
        self.prev_raw_position
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn bounce(&self) -> bool {
        self.bounce
    }

    pub fn use_ticks(&self) -> bool {
        self.use_ticks
    }

    pub fn ignore_global_pause(&self) -> bool {
        self.ignore_global_pause
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the last committed move finished the final loop
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn state(&self) -> PlaybackState {
        match (self.paused, self.complete) {
            (false, _) => PlaybackState::Active,
            (true, true) => PlaybackState::Completed,
            (true, false) => PlaybackState::Paused,
        }
    }

    /// Loop and direction settings fed to the normalizer
    pub fn playback(&self) -> Playback {
        Playback {
            duration: self.duration,
            loop_count: self.loop_count,
            reversed: self.reversed,
            bounce: self.bounce,
        }
    }

    // Setters used by the owning tween. None of them re-evaluates the position.

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub fn set_loop(&mut self, setting: impl Into<crate::config::LoopSetting>) {
        self.loop_count = setting.into().count();
    }

    pub fn set_reversed(&mut self, value: bool) {
        self.reversed = value;
    }

    pub fn set_bounce(&mut self, value: bool) {
        self.bounce = value;
    }

    pub fn set_use_ticks(&mut self, value: bool) {
        self.use_ticks = value;
    }

    pub fn set_ignore_global_pause(&mut self, value: bool) {
        self.ignore_global_pause = value;
    }

    /// Timelines have no generic duplication policy: the tweened state
    /// belongs to the target, not to the timing engine.
    pub fn try_clone(&self) -> Result<Timeline> {
        Err(TimelineError::UnsupportedOperation("Timeline::try_clone"))
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Timeline]")
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("duration", &self.duration)
            .field("loop_count", &self.loop_count)
            .field("position", &self.position)
            .field("raw_position", &self.raw_position)
            .field("reversed", &self.reversed)
            .field("bounce", &self.bounce)
            .field("use_ticks", &self.use_ticks)
            .field("paused", &self.paused)
            .field("complete", &self.complete)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}

/// Builder for inserting a timeline into a [`Scheduler`]
pub struct TimelineBuilder {
    config: TimelineConfig,
    duration: f64,
    target: Option<Box<dyn TweenTarget>>,
    on_change: Option<EventHandler>,
}

impl TimelineBuilder {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            duration: 0.0,
            target: None,
            on_change: None,
        }
    }

    pub fn config(mut self, config: TimelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// The collaborator receiving position and action hooks
    pub fn target<T: TweenTarget + 'static>(mut self, target: T) -> Self {
        self.target = Some(Box::new(target));
        self
    }

    /// Subscribe to the `change` event once inserted
    pub fn on_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(handler));
        self
    }

    /// Insert the timeline, linking it into the active registry unless the
    /// config asks to start paused.
    pub fn spawn(self, scheduler: &mut Scheduler) -> TimelineId {
        let mut timeline = Timeline::new(&self.config, self.duration);
        timeline.target = self.target;
        let id = scheduler.insert(timeline);

        if let Some(handler) = self.on_change {
            scheduler.on_boxed(id, event_types::CHANGE, handler);
        }
        if !self.config.paused {
            scheduler.activate(id);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timeline_is_unadvanced() {
        let config = TimelineConfig::default().with_loop(true).with_bounce(true);
        let timeline = Timeline::new(&config, 250.0);

        assert_eq!(timeline.raw_position(), NEVER_ADVANCED);
        assert_eq!(timeline.position(), 0.0);
        assert_eq!(timeline.loop_count(), -1);
        assert!(timeline.bounce());
        assert!(timeline.is_paused());
        assert_eq!(timeline.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_display_label() {
        let timeline = Timeline::new(&TimelineConfig::default(), 1.0);
        assert_eq!(timeline.to_string(), "[Timeline]");
    }

    #[test]
    fn test_try_clone_is_unsupported() {
        let timeline = Timeline::new(&TimelineConfig::default(), 1.0);
        assert!(matches!(
            timeline.try_clone(),
            Err(TimelineError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_setters_do_not_touch_position() {
        let mut timeline = Timeline::new(&TimelineConfig::default(), 100.0);
        timeline.set_duration(400.0);
        timeline.set_loop(2);
        timeline.set_reversed(true);

        assert_eq!(timeline.duration(), 400.0);
        assert_eq!(timeline.loop_count(), 2);
        assert!(timeline.playback().reversed);
        assert_eq!(timeline.raw_position(), NEVER_ADVANCED);
    }
}
