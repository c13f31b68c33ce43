//! Timing functions (easing curves) for animations.
//!
//! Timing functions control the rate of change during an animation, allowing
//! for natural-feeling motion rather than linear interpolation.
//!
//! ## Built-in Easing Functions
//!
//! The named curves follow their CSS definitions:
//!
//! - [`TimingFunction::Linear`] - Constant speed (no easing)
//! - [`TimingFunction::Ease`] - `cubic-bezier(0.25, 0.1, 0.25, 1)`
//! - [`TimingFunction::EaseIn`] - `cubic-bezier(0.42, 0, 1, 1)`, accelerates
//! - [`TimingFunction::EaseOut`] - `cubic-bezier(0, 0, 0.58, 1)`, decelerates
//! - [`TimingFunction::EaseInOut`] - `cubic-bezier(0.42, 0, 0.58, 1)`
//!
//! ## Advanced Options
//!
//! - [`TimingFunction::CubicBezier`] - CSS-style cubic bezier curve
//! - [`TimingFunction::Steps`] / [`TimingFunction::StepsStart`] - Jump between `n` discrete steps
//! - [`TimingFunction::Custom`] - User-defined function
//!
//! Timing functions parse from their CSS spelling:
//!
//! ```
//! use flipclock::animation::TimingFunction;
//!
//! let curve: TimingFunction = "cubic-bezier(0.2, 0.8, 0.2, 1)".parse().unwrap();
//! assert!(curve.evaluate(0.5) > 0.5);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// Timing function that controls the animation curve
#[derive(Clone)]
pub enum TimingFunction {
    /// Linear interpolation (constant speed)
    Linear,
    /// The CSS default curve
    Ease,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Starts slow, speeds up, then slows down
    EaseInOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// CSS `steps(n)` with jump-end semantics
    Steps(u32),
    /// CSS `steps(n, start)`: jumps at the start of each step
    StepsStart(u32),
    /// Custom timing function
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl TimingFunction {
    /// Evaluate the timing function at time t (0.0 to 1.0)
    /// Returns the interpolation factor (can exceed [0, 1] for overshoot)
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingFunction::Linear => t,
            TimingFunction::Ease => cubic_bezier(t, 0.25, 0.1, 0.25, 1.0),
            TimingFunction::EaseIn => cubic_bezier(t, 0.42, 0.0, 1.0, 1.0),
            TimingFunction::EaseOut => cubic_bezier(t, 0.0, 0.0, 0.58, 1.0),
            TimingFunction::EaseInOut => cubic_bezier(t, 0.42, 0.0, 0.58, 1.0),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
            TimingFunction::Steps(n) => steps(t, *n, f32::floor),
            TimingFunction::StepsStart(n) => steps(t, *n, |x| (x + 1.0).floor()),
            TimingFunction::Custom(f) => f(t),
        }
    }

    /// Create a custom timing function from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        TimingFunction::Custom(Arc::new(f))
    }

    /// Parse a CSS easing string, falling back to `default` when the string
    /// is not understood.
    pub fn parse_or(input: &str, default: TimingFunction) -> TimingFunction {
        input.parse().unwrap_or_else(|err| {
            log::warn!("{err}, using {default}");
            default
        })
    }
}

impl FromStr for TimingFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || Error::InvalidEasing(trimmed.to_string());

        match trimmed {
            "linear" => return Ok(TimingFunction::Linear),
            "ease" => return Ok(TimingFunction::Ease),
            "ease-in" => return Ok(TimingFunction::EaseIn),
            "ease-out" => return Ok(TimingFunction::EaseOut),
            "ease-in-out" => return Ok(TimingFunction::EaseInOut),
            "step-end" => return Ok(TimingFunction::Steps(1)),
            "step-start" => return Ok(TimingFunction::StepsStart(1)),
            _ => {}
        }

        let (name, args) = trimmed
            .strip_suffix(')')
            .and_then(|rest| rest.split_once('('))
            .ok_or_else(invalid)?;

        match name.trim() {
            "cubic-bezier" => {
                let values = args
                    .split(',')
                    .map(|v| v.trim().parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                match values[..] {
                    [x1, y1, x2, y2] if (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2) => {
                        Ok(TimingFunction::CubicBezier(x1, y1, x2, y2))
                    }
                    _ => Err(invalid()),
                }
            }
            "steps" => {
                let mut parts = args.split(',').map(str::trim);
                let count = parts
                    .next()
                    .and_then(|n| n.parse::<u32>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(invalid)?;
                // jump-none and jump-both are not supported
                match (parts.next(), parts.next()) {
                    (None | Some("end" | "jump-end"), None) => Ok(TimingFunction::Steps(count)),
                    (Some("start" | "jump-start"), None) => Ok(TimingFunction::StepsStart(count)),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for TimingFunction {
    /// Writes the CSS spelling of the curve
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "linear"),
            TimingFunction::Ease => write!(f, "ease"),
            TimingFunction::EaseIn => write!(f, "ease-in"),
            TimingFunction::EaseOut => write!(f, "ease-out"),
            TimingFunction::EaseInOut => write!(f, "ease-in-out"),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            TimingFunction::Steps(n) => write!(f, "steps({})", n),
            TimingFunction::StepsStart(n) => write!(f, "steps({}, start)", n),
            TimingFunction::Custom(_) => write!(f, "linear"),
        }
    }
}

impl fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "Linear"),
            TimingFunction::Ease => write!(f, "Ease"),
            TimingFunction::EaseIn => write!(f, "EaseIn"),
            TimingFunction::EaseOut => write!(f, "EaseOut"),
            TimingFunction::EaseInOut => write!(f, "EaseInOut"),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            TimingFunction::Steps(n) => write!(f, "Steps({})", n),
            TimingFunction::StepsStart(n) => write!(f, "StepsStart({})", n),
            TimingFunction::Custom(_) => write!(f, "Custom"),
        }
    }
}

fn steps(t: f32, count: u32, round: fn(f32) -> f32) -> f32 {
    let count = count.max(1) as f32;
    (round(t * count) / count).min(1.0)
}

/// Cubic bezier curve evaluation
/// Simplified implementation assuming x1, x2 are in [0, 1]
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Use Newton-Raphson to solve for t given x
    let mut current_t = t;
    for _ in 0..8 {
        let current_x = cubic_bezier_x(current_t, x1, x2);
        let current_slope = cubic_bezier_slope(current_t, x1, x2);
        if current_slope.abs() < 1e-6 {
            break;
        }
        current_t -= (current_x - t) / current_slope;
    }
    cubic_bezier_y(current_t.clamp(0.0, 1.0), y1, y2)
}

fn cubic_bezier_x(t: f32, x1: f32, x2: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    3.0 * mt2 * t * x1 + 3.0 * mt * t2 * x2 + t3
}

fn cubic_bezier_y(t: f32, y1: f32, y2: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    3.0 * mt2 * t * y1 + 3.0 * mt * t2 * y2 + t3
}

fn cubic_bezier_slope(t: f32, x1: f32, x2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        assert_eq!(TimingFunction::Linear.evaluate(0.0), 0.0);
        assert_eq!(TimingFunction::Linear.evaluate(0.5), 0.5);
        assert_eq!(TimingFunction::Linear.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_ease_in() {
        let result = TimingFunction::EaseIn.evaluate(0.5);
        assert!(result < 0.5); // Should be slower at start
    }

    #[test]
    fn test_ease_out() {
        let result = TimingFunction::EaseOut.evaluate(0.5);
        assert!(result > 0.5); // Should be faster at start
    }

    #[test]
    fn test_endpoints_are_fixed() {
        for curve in [
            TimingFunction::Ease,
            TimingFunction::EaseIn,
            TimingFunction::EaseOut,
            TimingFunction::EaseInOut,
        ] {
            assert!(curve.evaluate(0.0).abs() < 1e-3, "{curve:?} at 0");
            assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-3, "{curve:?} at 1");
        }
    }

    #[test]
    fn test_parse_named_and_functional() {
        assert!(matches!("ease-in".parse(), Ok(TimingFunction::EaseIn)));
        assert!(matches!(" ease-out ".parse(), Ok(TimingFunction::EaseOut)));
        assert!(matches!(
            "cubic-bezier(0.1, 0.7, 1.0, 0.1)".parse(),
            Ok(TimingFunction::CubicBezier(..))
        ));
        assert!(matches!("steps(4)".parse(), Ok(TimingFunction::Steps(4))));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("bouncy".parse::<TimingFunction>().is_err());
        assert!("cubic-bezier(2, 0, 0, 1)".parse::<TimingFunction>().is_err());
        assert!("cubic-bezier(0, 0, 1)".parse::<TimingFunction>().is_err());
        assert!("steps(0)".parse::<TimingFunction>().is_err());
        assert!("steps(4, jump-both)".parse::<TimingFunction>().is_err());
        assert!("steps(4, start, end)".parse::<TimingFunction>().is_err());
    }

    #[test]
    fn test_parse_or_falls_back() {
        let curve = TimingFunction::parse_or("wobble", TimingFunction::EaseOut);
        assert!(matches!(curve, TimingFunction::EaseOut));
    }

    #[test]
    fn test_steps() {
        let curve = TimingFunction::Steps(4);
        assert_eq!(curve.evaluate(0.1), 0.0);
        assert_eq!(curve.evaluate(0.3), 0.25);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_steps_position_argument() {
        assert!(matches!("steps(4, end)".parse(), Ok(TimingFunction::Steps(4))));
        let start: TimingFunction = "steps(4, start)".parse().unwrap();
        assert!(matches!(start, TimingFunction::StepsStart(4)));
        assert_eq!(start.to_string(), "steps(4, start)");

        assert_eq!(start.evaluate(0.0), 0.25);
        assert_eq!(start.evaluate(0.1), 0.25);
        assert_eq!(start.evaluate(0.3), 0.5);
        assert_eq!(start.evaluate(1.0), 1.0);
        assert!(matches!("step-start".parse(), Ok(TimingFunction::StepsStart(1))));
    }
}
