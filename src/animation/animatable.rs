/// Trait for types that can be animated by interpolating between values
pub trait Animatable: Clone + PartialEq + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    /// t can exceed [0, 1] range for overshoot effects
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

/// A rotation around the horizontal axis, in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct RotateX(pub f32);

impl Animatable for RotateX {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        RotateX(f32::lerp(&from.0, &to.0, t))
    }
}

impl std::fmt::Display for RotateX {
    /// CSS transform spelling
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rotateX({}deg)", self.0)
    }
}
