//! Animation primitives: easing curves, keyframe tracks, and the shared
//! registry of flip keyframes.

mod animatable;
mod keyframes;
pub mod registry;
mod timing;

use std::rc::Rc;

pub use animatable::{Animatable, RotateX};
pub use keyframes::{Keyframe, Keyframes};
pub use registry::{AnimationProfile, AnimationRegistry, FlipKeyframes, ProfileKey};
pub use timing::TimingFunction;

/// Configuration for how a property animates over time
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of the animation in milliseconds
    pub duration_ms: f32,
    /// Timing function controlling the animation curve
    pub timing: TimingFunction,
    /// Delay before animation starts in milliseconds
    pub delay_ms: f32,
}

impl Transition {
    /// Create a new transition with the given duration and timing function
    pub fn new(duration_ms: f32, timing: TimingFunction) -> Self {
        Self {
            duration_ms,
            timing,
            delay_ms: 0.0,
        }
    }

    /// Set the delay before the animation starts
    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the duration of the animation
    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the timing function
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    /// Time from start until the animation has fully played
    pub fn end_ms(&self) -> f32 {
        self.delay_ms + self.duration_ms
    }

    /// Normalized progress at `elapsed_ms`, or `None` while still delayed
    pub fn progress(&self, elapsed_ms: f32) -> Option<f32> {
        let active = elapsed_ms - self.delay_ms;
        if active < 0.0 {
            return None;
        }
        if self.duration_ms <= 0.0 {
            return Some(1.0);
        }
        Some((active / self.duration_ms).min(1.0))
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(300.0, TimingFunction::Ease)
    }
}

/// A keyframe track played with a transition.
///
/// Holds the last keyframe once finished (`fill-mode: forwards`) and shows
/// `base` while the delay is running.
#[derive(Clone, Debug)]
pub struct KeyframeAnimation<T> {
    keyframes: Rc<Keyframes<T>>,
    transition: Transition,
    base: T,
}

impl<T: Animatable> KeyframeAnimation<T> {
    pub fn new(keyframes: Rc<Keyframes<T>>, transition: Transition, base: T) -> Self {
        Self {
            keyframes,
            transition,
            base,
        }
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn sample(&self, elapsed_ms: f32) -> T {
        match self.transition.progress(elapsed_ms) {
            None => self.base.clone(),
            Some(progress) => self.keyframes.sample(progress, &self.transition.timing),
        }
    }

    pub fn is_finished(&self, elapsed_ms: f32) -> bool {
        elapsed_ms >= self.transition.end_ms()
    }
}
