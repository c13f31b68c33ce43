//! Flip-clock countdown widgets.
//!
//! A [`FlipClock`](clock::FlipClock) counts down to a target instant and
//! shows the remaining days, hours, minutes and seconds on flip cards. Each
//! card flips independently when its digit changes: the old digit falls away
//! on the upper flap and the new one lands on the lower flap with a small
//! bounce.
//!
//! The crate does not draw anything itself. A clock produces
//! [`ClockFrame`](clock::ClockFrame) snapshots (digits, flap angles, labels,
//! separators) and CSS keyframe rules, and a [`ClockDriver`](driver::ClockDriver)
//! schedules ticks and animation frames on a calloop event loop.
//!
//! ```
//! use chrono::{Duration, Utc};
//! use flipclock::prelude::*;
//!
//! let now = Utc::now();
//! let config = FlipClockConfig::new()
//!     .target(now + Duration::seconds(90))
//!     .segments(Segments::MINUTES | Segments::SECONDS);
//! let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
//!
//! let report = clock.tick(now, std::time::Instant::now());
//! assert_eq!(report.remaining, TimeRemaining::new(0, 0, 1, 30));
//! ```

pub mod animation;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod digit;
pub mod driver;
pub mod error;
pub mod segments;
pub mod style;
pub mod time;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::animation::{AnimationProfile, AnimationRegistry, ProfileKey, TimingFunction};
    pub use crate::clock::{ClockFrame, FlipClock, FrameItem, GroupFrame, TickReport};
    pub use crate::config::{
        AnimationConfig, CardStyle, DigitStyle, FlipClockConfig, LabelStyle, Labels, LineStyle,
        SeparatorConfig, SeparatorKind,
    };
    pub use crate::countdown::{CountdownEngine, CountdownSource, StaticTime, TimeRemaining};
    pub use crate::digit::{CardFrame, CellId, DigitCell, DigitPhase, FlipStarted, OverlapPolicy};
    pub use crate::driver::{ClockDriver, FrameSink};
    pub use crate::segments::{Segment, Segments};
    pub use crate::style::{Color, Length};
    pub use crate::time::{ManualTimeSource, SystemTimeSource, TimeSource};
}
