//! Day-counter sweep from 0 to the final day over a fixed wall-clock duration.
//!
//! The sweep is a pure mapping from elapsed time to a day; the page scheduler owns
//! the clock and calls [`TimelineRun::tick`] on every frame.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    final_days: u32,
    duration: Duration,
}

impl Timeline {
    pub fn new(final_days: u32, duration: Duration) -> Self {
        Self {
            final_days,
            duration,
        }
    }

    /// Normalized progress for an elapsed time, clamped to [0, 1].
    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Linear day for a progress value. Exactly `final_days` at 1.0.
    pub fn day_at(&self, progress: f64) -> u32 {
        if progress.is_nan() || progress <= 0.0 {
            return 0;
        }
        if progress >= 1.0 {
            return self.final_days;
        }
        let day = (progress * f64::from(self.final_days)).floor() as u32;
        day.min(self.final_days)
    }

    pub fn start(self, now: Instant) -> TimelineRun {
        TimelineRun {
            timeline: self,
            started: now,
            last_day: None,
            finished: false,
        }
    }
}

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineTick {
    /// A new day to render. `last` is set on the final frame.
    Frame { days: u32, progress: f64, last: bool },
    /// Same day as the previous frame; nothing to redraw.
    Unchanged,
    /// The sweep already delivered its final frame.
    Finished,
}

#[derive(Debug, Clone)]
pub struct TimelineRun {
    timeline: Timeline,
    started: Instant,
    last_day: Option<u32>,
    finished: bool,
}

impl TimelineRun {
    pub fn tick(&mut self, now: Instant) -> TimelineTick {
        if self.finished {
            return TimelineTick::Finished;
        }
        let progress = self
            .timeline
            .progress_at(now.saturating_duration_since(self.started));
        let days = self.timeline.day_at(progress);
        let last = progress >= 1.0;
        if !last && self.last_day == Some(days) {
            return TimelineTick::Unchanged;
        }
        self.last_day = Some(days);
        self.finished = last;
        TimelineTick::Frame {
            days,
            progress,
            last,
        }
    }
}
