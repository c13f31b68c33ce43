//! Keyframe tracks.
//!
//! A track is a list of `(offset, value)` stops over normalized progress.
//! Like CSS `@keyframes`, the timing function is applied to each interval
//! between two stops, not to the track as a whole.

use std::fmt::{self, Display, Write};

use super::{Animatable, TimingFunction};

/// A single stop in a keyframe track
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// Position in the track, 0.0 to 1.0
    pub offset: f32,
    pub value: T,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Keyframes<T> {
    stops: Vec<Keyframe<T>>,
}

impl<T: Animatable> Keyframes<T> {
    /// A track that starts at `from` and ends at `to`
    pub fn new(from: T, to: T) -> Self {
        Self {
            stops: vec![
                Keyframe {
                    offset: 0.0,
                    value: from,
                },
                Keyframe {
                    offset: 1.0,
                    value: to,
                },
            ],
        }
    }

    /// Insert an intermediate stop. Offsets are clamped to [0, 1]; a stop at
    /// an existing offset replaces it.
    pub fn stop(mut self, offset: f32, value: T) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        match self
            .stops
            .iter()
            .position(|k| k.offset >= offset)
        {
            Some(i) if self.stops[i].offset == offset => self.stops[i].value = value,
            Some(i) => self.stops.insert(i, Keyframe { offset, value }),
            None => self.stops.push(Keyframe { offset, value }),
        }
        self
    }

    pub fn stops(&self) -> &[Keyframe<T>] {
        &self.stops
    }

    pub fn first(&self) -> &T {
        &self.stops[0].value
    }

    pub fn last(&self) -> &T {
        &self.stops[self.stops.len() - 1].value
    }

    /// Sample the track at `progress` (clamped to [0, 1]), easing each
    /// interval with `timing`.
    pub fn sample(&self, progress: f32, timing: &TimingFunction) -> T {
        let progress = progress.clamp(0.0, 1.0);

        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if progress <= b.offset {
                let span = b.offset - a.offset;
                if span <= f32::EPSILON {
                    return b.value.clone();
                }
                let local = (progress - a.offset) / span;
                return T::lerp(&a.value, &b.value, timing.evaluate(local));
            }
        }

        self.last().clone()
    }
}

impl<T: Animatable + Display> Keyframes<T> {
    /// Render the track as a CSS `@keyframes` rule
    pub fn to_css(&self, name: &str) -> String {
        let mut css = String::new();
        let _ = writeln!(css, "@keyframes {name} {{");
        for stop in &self.stops {
            let _ = writeln!(
                css,
                "  {}% {{ transform: {}; }}",
                (stop.offset * 100.0).round(),
                stop.value
            );
        }
        css.push_str("}\n");
        css
    }
}

impl<T: Animatable + Display> Display for Keyframes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|k| format!("{}%: {}", (k.offset * 100.0).round(), k.value))
            .collect();
        write!(f, "[{}]", stops.join(", "))
    }
}
