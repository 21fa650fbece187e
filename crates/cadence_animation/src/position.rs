//! Position normalization
//!
//! Maps a cumulative ("raw") position onto a single loop of a timeline,
//! taking loop count, static reversal and bounce into account.

/// Raw position of a timeline that has never been advanced
pub const NEVER_ADVANCED: f64 = -1.0;

/// Loop and direction configuration of a timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playback {
    /// Length of one loop
    pub duration: f64,
    /// Additional loops after the first, -1 for infinite
    pub loop_count: i32,
    pub reversed: bool,
    pub bounce: bool,
}

impl Playback {
    pub fn new(duration: f64, loop_count: i32) -> Self {
        Self {
            duration,
            loop_count,
            reversed: false,
            bounce: false,
        }
    }

    /// Whether playback runs backwards during loop `loop_index`.
    ///
    /// Bounce flips direction on odd loops; a static reverse flips it again.
    pub fn is_reversed(&self, loop_index: i64) -> bool {
        self.reversed != (self.bounce && loop_index % 2 != 0)
    }

    /// Split a raw position into `(loop_index, offset_in_loop)`
    pub fn decompose(&self, raw: f64) -> (i64, f64) {
        if self.duration <= 0.0 {
            return (0, 0.0);
        }
        let loop_index = (raw / self.duration).floor() as i64;
        let t = raw - loop_index as f64 * self.duration;
        (loop_index, t.clamp(0.0, self.duration))
    }

    /// Apply the direction of `loop_index` to an in-loop offset
    pub fn directed(&self, loop_index: i64, t: f64) -> f64 {
        if self.is_reversed(loop_index) {
            self.duration - t
        } else {
            t
        }
    }

    fn is_finite(&self) -> bool {
        self.loop_count != -1
    }
}

/// A committed move produced by [`normalize`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Direction-adjusted position within the loop
    pub position: f64,
    /// Effective raw position, saturated at the end of the last loop
    pub raw_position: f64,
    pub loop_index: i64,
    pub complete: bool,
    /// Whether the landing loop plays backwards
    pub reversed: bool,
}

/// Outcome of normalizing a raw target
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalized {
    /// Zero-length timeline advanced for the first time
    Degenerate,
    /// Target resolves to the committed position; nothing to do
    Unchanged { complete: bool },
    Moved(Step),
}

impl Normalized {
    pub fn is_complete(&self) -> bool {
        match self {
            Normalized::Degenerate => true,
            Normalized::Unchanged { complete } => *complete,
            Normalized::Moved(step) => step.complete,
        }
    }
}

/// Normalize `raw_target` against `playback`, given the last committed raw
/// position `prev_raw`.
pub fn normalize(raw_target: f64, playback: &Playback, prev_raw: f64) -> Normalized {
    let duration = playback.duration;

    if duration == 0.0 {
        return if prev_raw == NEVER_ADVANCED {
            Normalized::Degenerate
        } else {
            Normalized::Unchanged { complete: true }
        };
    }

    let mut raw = raw_target.max(0.0);
    let (mut loop_index, mut t) = playback.decompose(raw);
    let mut complete = false;

    if playback.is_finite() && loop_index > i64::from(playback.loop_count) {
        loop_index = i64::from(playback.loop_count);
        t = duration;
        raw = loop_index as f64 * duration + duration;
        complete = true;
    }

    if raw == prev_raw {
        return Normalized::Unchanged { complete };
    }

    let reversed = playback.is_reversed(loop_index);
    if reversed {
        t = duration - t;
    }

    Normalized::Moved(Step {
        position: t,
        raw_position: raw,
        loop_index,
        complete,
        reversed,
    })
}
