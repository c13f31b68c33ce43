//! Shared flip keyframes.
//!
//! Every card of every clock that uses the same duration and bounce plays the
//! same pair of keyframe tracks. The registry builds each pair once, on first
//! use, and hands out shared references after that. Entries are never evicted
//! while the registry lives; the number of distinct profiles is bounded by
//! configuration, not by how long a clock runs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::{Keyframes, RotateX, TimingFunction};

/// Default duration of each half of a flip
pub const DEFAULT_FLIP_DURATION_MS: u32 = 300;
/// Default overshoot of the landing flap
pub const DEFAULT_BOUNCE_DEGREES: f32 = 8.0;

/// Timing and feel of a flip.
#[derive(Clone, Debug)]
pub struct AnimationProfile {
    /// Duration of each half-flip in milliseconds
    pub flip_duration_ms: u32,
    /// Bounce overshoot in degrees (0 disables the bounce)
    pub bounce_degrees: f32,
    /// Curve of the top flap falling away
    pub flip_down_easing: TimingFunction,
    /// Curve of the bottom flap landing
    pub flip_up_easing: TimingFunction,
}

impl AnimationProfile {
    pub fn new(flip_duration_ms: u32, bounce_degrees: f32) -> Self {
        Self {
            flip_duration_ms,
            bounce_degrees,
            ..Self::default()
        }
    }

    /// Registry key; depends on duration and bounce only
    pub fn key(&self) -> ProfileKey {
        ProfileKey::new(self.flip_duration_ms, self.bounce_degrees)
    }

    /// How long a fallback timer waits before forcing a flip to settle
    pub fn fallback_ms(&self) -> u32 {
        self.flip_duration_ms.saturating_mul(2)
    }
}

impl Default for AnimationProfile {
    fn default() -> Self {
        Self {
            flip_duration_ms: DEFAULT_FLIP_DURATION_MS,
            bounce_degrees: DEFAULT_BOUNCE_DEGREES,
            flip_down_easing: TimingFunction::EaseIn,
            flip_up_easing: TimingFunction::EaseOut,
        }
    }
}

/// Identity of a registered keyframe pair, e.g. `fc-300-8`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProfileKey(String);

impl ProfileKey {
    pub fn new(flip_duration_ms: u32, bounce_degrees: f32) -> Self {
        // Dots are not valid in CSS identifiers.
        let bounce = format!("{}", bounce_degrees).replace('.', "_");
        Self(format!("fc-{}-{}", flip_duration_ms, bounce))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn flip_top_name(&self) -> String {
        format!("{}-flip-top", self.0)
    }

    pub fn flip_bottom_name(&self) -> String {
        format!("{}-flip-bottom", self.0)
    }
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two tracks of a flip.
#[derive(Debug)]
pub struct FlipKeyframes {
    pub key: ProfileKey,
    /// Upper flap: 0deg to -90deg
    pub top: Rc<Keyframes<RotateX>>,
    /// Lower flap: 90deg, overshoot to -bounce, back to +bounce/2, rest at 0deg
    pub bottom: Rc<Keyframes<RotateX>>,
}

impl FlipKeyframes {
    pub fn build(flip_duration_ms: u32, bounce_degrees: f32) -> Self {
        let top = Keyframes::new(RotateX(0.0), RotateX(-90.0));
        let bottom = Keyframes::new(RotateX(90.0), RotateX(0.0))
            .stop(0.6, RotateX(-bounce_degrees))
            .stop(0.8, RotateX(bounce_degrees / 2.0));
        Self {
            key: ProfileKey::new(flip_duration_ms, bounce_degrees),
            top: Rc::new(top),
            bottom: Rc::new(bottom),
        }
    }

    /// Both `@keyframes` rules
    pub fn to_css(&self) -> String {
        let mut css = self.top.to_css(&self.key.flip_top_name());
        css.push_str(&self.bottom.to_css(&self.key.flip_bottom_name()));
        css
    }
}

/// Append-only store of flip keyframes, keyed by [`ProfileKey`].
///
/// Cloning yields another handle to the same store. Clocks can share
/// [`AnimationRegistry::global`] or be handed a private registry.
#[derive(Clone, Default)]
pub struct AnimationRegistry {
    entries: Rc<RefCell<BTreeMap<ProfileKey, Rc<FlipKeyframes>>>>,
}

thread_local! {
    static GLOBAL_REGISTRY: AnimationRegistry = AnimationRegistry::new();
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every clock on this thread
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(|registry| registry.clone())
    }

    /// Register the keyframes for `profile` unless they already exist.
    /// Returns the key either way.
    pub fn ensure_registered(&self, profile: &AnimationProfile) -> ProfileKey {
        let key = profile.key();
        let mut entries = self.entries.borrow_mut();
        if !entries.contains_key(&key) {
            log::debug!("registering flip keyframes {key}");
            entries.insert(
                key.clone(),
                Rc::new(FlipKeyframes::build(
                    profile.flip_duration_ms,
                    profile.bounce_degrees,
                )),
            );
        }
        key
    }

    pub fn get(&self, key: &ProfileKey) -> Option<Rc<FlipKeyframes>> {
        self.entries.borrow().get(key).cloned()
    }

    /// Register if needed and return the keyframes in one step
    pub fn keyframes_for(&self, profile: &AnimationProfile) -> Rc<FlipKeyframes> {
        let key = profile.key();
        if let Some(existing) = self.get(&key) {
            return existing;
        }
        self.ensure_registered(profile);
        let entries = self.entries.borrow();
        Rc::clone(&entries[&key])
    }

    pub fn contains(&self, key: &ProfileKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn keys(&self) -> Vec<ProfileKey> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Drop every entry. Keyframes already handed out stay valid.
    pub fn reset(&self) {
        self.entries.borrow_mut().clear();
    }

    /// All registered rules as one stylesheet, ordered by key
    pub fn stylesheet(&self) -> String {
        self.entries
            .borrow()
            .values()
            .map(|entry| entry.to_css())
            .collect()
    }
}

impl fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
