//! Countdown engine.
//!
//! The engine turns "target minus now" into day/hour/minute/second buckets.
//! Every tick recomputes from the wall clock, so a late or skipped tick
//! (suspended process, loaded event loop) corrects itself on the next one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time split into display buckets.
///
/// A running countdown keeps hours below 24 and minutes and seconds below
/// 60. Static time is shown exactly as configured, so any bucket may be
/// wider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub const fn new(days: u64, hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Decompose a distance in milliseconds. Every bucket is floored; a
    /// distance of zero or less is [`TimeRemaining::ZERO`].
    pub fn from_distance_ms(distance: i64) -> Self {
        if distance <= 0 {
            return Self::ZERO;
        }
        Self {
            days: (distance / MS_PER_DAY) as u64,
            hours: ((distance % MS_PER_DAY) / MS_PER_HOUR) as u64,
            minutes: ((distance % MS_PER_HOUR) / MS_PER_MINUTE) as u64,
            seconds: ((distance % MS_PER_MINUTE) / MS_PER_SECOND) as u64,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Whole milliseconds represented by the buckets
    pub fn total_ms(&self) -> i64 {
        self.days as i64 * MS_PER_DAY
            + self.hours as i64 * MS_PER_HOUR
            + self.minutes as i64 * MS_PER_MINUTE
            + self.seconds as i64 * MS_PER_SECOND
    }
}

/// A frozen time where every field may be omitted (omitted means zero).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticTime {
    pub days: Option<u64>,
    pub hours: Option<u64>,
    pub minutes: Option<u64>,
    pub seconds: Option<u64>,
}

impl From<StaticTime> for TimeRemaining {
    fn from(time: StaticTime) -> Self {
        Self {
            days: time.days.unwrap_or(0),
            hours: time.hours.unwrap_or(0),
            minutes: time.minutes.unwrap_or(0),
            seconds: time.seconds.unwrap_or(0),
        }
    }
}

/// Where the displayed time comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownSource {
    /// Count down to a wall-clock instant
    Target(DateTime<Utc>),
    /// Display a frozen value; nothing ticks
    Static(TimeRemaining),
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub remaining: TimeRemaining,
    /// True only on the tick that fired the completion callback
    pub completed: bool,
}

/// Callback invoked once when the countdown reaches zero.
pub type CompletionCallback = Box<dyn FnMut()>;

pub struct CountdownEngine {
    source: CountdownSource,
    on_complete: Option<CompletionCallback>,
    completed: bool,
    last: Option<TimeRemaining>,
}

impl CountdownEngine {
    pub fn new(source: CountdownSource) -> Self {
        Self {
            source,
            on_complete: None,
            completed: false,
            last: None,
        }
    }

    /// Set the callback fired when the countdown first reaches zero.
    pub fn on_complete<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn set_on_complete(&mut self, callback: Option<CompletionCallback>) {
        self.on_complete = callback;
    }

    pub fn source(&self) -> CountdownSource {
        self.source
    }

    /// Static engines compute once and are never scheduled.
    pub fn is_static(&self) -> bool {
        matches!(self.source, CountdownSource::Static(_))
    }

    /// Whether the completion signal has already fired in this run
    pub fn has_completed(&self) -> bool {
        self.completed
    }

    /// The value produced by the most recent tick
    pub fn last(&self) -> Option<TimeRemaining> {
        self.last
    }

    /// Count down to a new instant. The next tick computes from it.
    pub fn set_target(&mut self, target: DateTime<Utc>) {
        log::debug!("countdown target set to {target}");
        self.source = CountdownSource::Target(target);
    }

    /// Freeze the displayed time.
    pub fn set_static(&mut self, time: TimeRemaining) {
        self.source = CountdownSource::Static(time);
    }

    /// Re-arm the completion signal for a new run.
    pub fn restart(&mut self) {
        self.completed = false;
        self.last = None;
    }

    /// Compute the remaining time at `now`, firing completion on the first
    /// zero result of a target countdown.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let remaining = match self.source {
            CountdownSource::Static(time) => time,
            CountdownSource::Target(target) => {
                TimeRemaining::from_distance_ms((target - now).num_milliseconds())
            }
        };
        self.last = Some(remaining);

        let fire = !self.completed && !self.is_static() && remaining.is_zero();
        if fire {
            self.completed = true;
            log::info!("countdown complete");
            if let Some(callback) = self.on_complete.as_mut() {
                callback();
            }
        }

        TickOutcome {
            remaining,
            completed: fire,
        }
    }
}

impl std::fmt::Debug for CountdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("source", &self.source)
            .field("completed", &self.completed)
            .field("last", &self.last)
            .finish()
    }
}
