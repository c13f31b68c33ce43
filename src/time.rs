//! Wall-clock access for the countdown.
//!
//! The countdown always recomputes from "now", so the source of "now" is a
//! trait: [`SystemTimeSource`] in applications, [`ManualTimeSource`] in tests
//! and demos that need to fast-forward.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Provides the current wall-clock instant.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock. Clones share the same instant.
#[derive(Clone, Debug)]
pub struct ManualTimeSource {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualTimeSource {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// The demo target used when no valid target is supplied: 88 days and
/// 14 hours after `start`.
pub fn default_target(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Duration::days(88) + Duration::hours(14)
}

/// Parse a target instant.
///
/// Accepts RFC 3339 (`2026-12-31T00:00:00+01:00`), a naive date-time taken as
/// UTC (`2026-12-31T00:00:00` or `2026-12-31 00:00:00`) and a bare date
/// (`2026-12-31`, midnight UTC).
pub fn parse_target(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidDate(input.to_string()))
}

/// Resolve an optional target string, substituting the default target when
/// it is missing or unparseable.
pub fn resolve_target(input: Option<&str>, start: DateTime<Utc>) -> DateTime<Utc> {
    match input.map(parse_target) {
        Some(Ok(target)) => target,
        Some(Err(err)) => {
            log::warn!("{err}, counting down to the default target instead");
            default_target(start)
        }
        None => default_target(start),
    }
}
