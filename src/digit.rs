//! A single flip card.
//!
//! Each card owns a small state machine. While idle it shows one digit; when
//! handed a different digit it flips: the upper flap carrying the old digit
//! falls away, then the lower flap carrying the new digit swings up and
//! bounces into place. The card settles when the lower flap has finished, or
//! when the fallback deadline (twice the flip duration) passes, whichever is
//! first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::animation::{
    AnimationProfile, FlipKeyframes, KeyframeAnimation, RotateX, Transition,
};

/// Unique identifier for a mounted card
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CellId(u64);

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

impl CellId {
    fn next() -> Self {
        Self(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where a card is in its flip cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigitPhase {
    Idle(u8),
    Flipping { from: u8, to: u8 },
}

/// What a card does with a new digit that arrives mid-flip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Keep the running flip and land on the newest digit
    #[default]
    Retarget,
    /// Finish the running flip, then flip again to the newest digit
    Queue,
}

/// Emitted whenever a card begins a flip, so the caller can arm the fallback
/// timer for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipStarted {
    pub cell: CellId,
    /// Identifies this particular flip of the card
    pub generation: u64,
    pub from: u8,
    pub to: u8,
    /// Delay after which [`DigitCell::fallback_elapsed`] should be called
    pub fallback: Duration,
}

/// A rotating half of the card
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flap {
    pub digit: u8,
    pub rotation: RotateX,
}

/// Everything needed to paint one card at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardFrame {
    pub cell: CellId,
    /// Upper static half
    pub top: u8,
    /// Lower static half, always the settled digit
    pub bottom: u8,
    /// Falling flap with the old digit, only while flipping
    pub top_flap: Option<Flap>,
    /// Landing flap with the new digit, only while flipping
    pub bottom_flap: Option<Flap>,
}

impl CardFrame {
    /// The divider line across the middle is part of every card
    pub const HAS_DIVIDER: bool = true;

    pub fn is_flipping(&self) -> bool {
        self.top_flap.is_some() || self.bottom_flap.is_some()
    }
}

pub struct DigitCell {
    id: CellId,
    phase: DigitPhase,
    previous: u8,
    started_at: Option<Instant>,
    generation: u64,
    pending: Option<u8>,
    policy: OverlapPolicy,
    half_ms: f32,
    fallback: Duration,
    top: KeyframeAnimation<RotateX>,
    bottom: KeyframeAnimation<RotateX>,
}

impl DigitCell {
    pub fn new(value: u8, profile: &AnimationProfile, keyframes: &FlipKeyframes) -> Self {
        let half_ms = profile.flip_duration_ms as f32;
        let top = KeyframeAnimation::new(
            keyframes.top.clone(),
            Transition::new(half_ms, profile.flip_down_easing.clone()),
            RotateX(0.0),
        );
        let bottom = KeyframeAnimation::new(
            keyframes.bottom.clone(),
            Transition::new(half_ms, profile.flip_up_easing.clone()).delay(half_ms),
            RotateX(90.0),
        );

        Self {
            id: CellId::next(),
            phase: DigitPhase::Idle(value),
            previous: value,
            started_at: None,
            generation: 0,
            pending: None,
            policy: OverlapPolicy::default(),
            half_ms,
            fallback: Duration::from_millis(profile.fallback_ms() as u64),
            top,
            bottom,
        }
    }

    pub fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.policy = policy;
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn phase(&self) -> DigitPhase {
        self.phase
    }

    /// The digit shown on the static lower half
    pub fn current(&self) -> u8 {
        match self.phase {
            DigitPhase::Idle(v) => v,
            DigitPhase::Flipping { from, .. } => from,
        }
    }

    /// The digit the card is showing or flipping towards
    pub fn target(&self) -> u8 {
        match self.phase {
            DigitPhase::Idle(v) => v,
            DigitPhase::Flipping { to, .. } => self.pending.unwrap_or(to),
        }
    }

    /// The digit on the falling flap: the value the card showed, or was
    /// flipping to, before the most recent change
    pub fn previous(&self) -> u8 {
        self.previous
    }

    pub fn is_flipping(&self) -> bool {
        matches!(self.phase, DigitPhase::Flipping { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Deliver a new digit. Returns the flip it started, if any.
    pub fn set_value(&mut self, value: u8, now: Instant) -> Option<FlipStarted> {
        match self.phase {
            DigitPhase::Idle(current) if current == value => None,
            DigitPhase::Idle(current) => Some(self.start_flip(current, value, now)),
            DigitPhase::Flipping { from, to } => {
                match self.policy {
                    OverlapPolicy::Retarget => {
                        // The running flip keeps its timing. The digit it was
                        // heading for moves onto the falling flap, even when
                        // the new value is the settled one.
                        if to != value {
                            log::trace!("card {:?} retargets {} -> {}", self.id, to, value);
                            self.previous = to;
                            self.phase = DigitPhase::Flipping { from, to: value };
                        }
                    }
                    OverlapPolicy::Queue => {
                        self.pending = (value != to).then_some(value);
                    }
                }
                None
            }
        }
    }

    fn start_flip(&mut self, from: u8, to: u8, now: Instant) -> FlipStarted {
        self.previous = from;
        self.phase = DigitPhase::Flipping { from, to };
        self.started_at = Some(now);
        self.generation += 1;
        log::trace!("card {:?} flips {} -> {}", self.id, from, to);
        FlipStarted {
            cell: self.id,
            generation: self.generation,
            from,
            to,
            fallback: self.fallback,
        }
    }

    fn elapsed_ms(&self, now: Instant) -> f32 {
        self.started_at
            .map(|start| now.saturating_duration_since(start).as_micros() as f32 / 1000.0)
            .unwrap_or(0.0)
    }

    /// Settle the running flip, starting the queued one if there is one.
    fn settle(&mut self, now: Instant) -> Option<FlipStarted> {
        let DigitPhase::Flipping { to, .. } = self.phase else {
            return None;
        };
        self.phase = DigitPhase::Idle(to);
        self.started_at = None;

        match self.pending.take() {
            Some(next) if next != to => Some(self.start_flip(to, next, now)),
            _ => None,
        }
    }

    /// The landing flap reported that it finished.
    pub fn animation_end(&mut self, now: Instant) -> Option<FlipStarted> {
        self.settle(now)
    }

    /// The fallback timer for flip `generation` expired. Ignored if that flip
    /// already settled.
    pub fn fallback_elapsed(&mut self, generation: u64, now: Instant) -> Option<FlipStarted> {
        if !self.is_flipping() || generation != self.generation {
            return None;
        }
        log::debug!("card {:?} settled by fallback timer", self.id);
        self.settle(now)
    }

    /// Advance to `now`, settling the card once the landing flap has played
    /// out.
    pub fn advance(&mut self, now: Instant) -> Option<FlipStarted> {
        if self.is_flipping() && self.bottom.is_finished(self.elapsed_ms(now)) {
            return self.animation_end(now);
        }
        None
    }

    pub fn frame(&self, now: Instant) -> CardFrame {
        match self.phase {
            DigitPhase::Idle(value) => CardFrame {
                cell: self.id,
                top: value,
                bottom: value,
                top_flap: None,
                bottom_flap: None,
            },
            DigitPhase::Flipping { from, to } => {
                let elapsed = self.elapsed_ms(now);
                CardFrame {
                    cell: self.id,
                    top: if elapsed < self.half_ms { self.previous } else { to },
                    bottom: from,
                    top_flap: Some(Flap {
                        digit: self.previous,
                        rotation: self.top.sample(elapsed),
                    }),
                    bottom_flap: Some(Flap {
                        digit: to,
                        rotation: self.bottom.sample(elapsed),
                    }),
                }
            }
        }
    }
}

impl std::fmt::Debug for DigitCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitCell")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TimingFunction;

    fn cell(value: u8) -> DigitCell {
        let profile = AnimationProfile {
            flip_down_easing: TimingFunction::Linear,
            flip_up_easing: TimingFunction::Linear,
            ..AnimationProfile::default()
        };
        let keyframes = FlipKeyframes::build(profile.flip_duration_ms, profile.bounce_degrees);
        DigitCell::new(value, &profile, &keyframes)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_same_value_never_flips() {
        let mut card = cell(4);
        assert!(card.set_value(4, Instant::now()).is_none());
        assert_eq!(card.phase(), DigitPhase::Idle(4));
    }

    #[test]
    fn test_nine_to_zero_flips_then_settles() {
        let t0 = Instant::now();
        let mut card = cell(9);
        let started = card.set_value(0, t0).unwrap();
        assert_eq!((started.from, started.to), (9, 0));
        assert_eq!(started.fallback, ms(600));
        assert_eq!(card.phase(), DigitPhase::Flipping { from: 9, to: 0 });
        assert_eq!(card.current(), 9);
        assert_eq!(card.previous(), 9);

        assert!(card.advance(t0 + ms(599)).is_none());
        assert!(card.is_flipping());
        card.advance(t0 + ms(600));
        assert_eq!(card.phase(), DigitPhase::Idle(0));
        assert_eq!(card.current(), 0);
    }

    #[test]
    fn test_frame_during_flip() {
        let t0 = Instant::now();
        let mut card = cell(3);
        card.set_value(2, t0);

        let early = card.frame(t0 + ms(150));
        assert_eq!((early.top, early.bottom), (3, 3));
        let top_flap = early.top_flap.unwrap();
        assert_eq!(top_flap.digit, 3);
        assert_eq!(top_flap.rotation, RotateX(-45.0));
        // Landing flap has not started yet.
        assert_eq!(early.bottom_flap.unwrap().rotation, RotateX(90.0));
        assert_eq!(early.bottom_flap.unwrap().digit, 2);

        let late = card.frame(t0 + ms(300) + ms(180));
        assert_eq!(late.top, 2);
        assert_eq!(late.top_flap.unwrap().rotation, RotateX(-90.0));
        assert_eq!(late.bottom_flap.unwrap().rotation, RotateX(-8.0));

        card.advance(t0 + ms(700));
        let settled = card.frame(t0 + ms(700));
        assert!(!settled.is_flipping());
        assert_eq!((settled.top, settled.bottom), (2, 2));
    }

    #[test]
    fn test_animation_end_settles_early() {
        let t0 = Instant::now();
        let mut card = cell(1);
        card.set_value(2, t0);
        card.animation_end(t0 + ms(10));
        assert_eq!(card.phase(), DigitPhase::Idle(2));
    }

    #[test]
    fn test_stale_fallback_is_ignored() {
        let t0 = Instant::now();
        let mut card = cell(1);
        let first = card.set_value(2, t0).unwrap();
        card.animation_end(t0 + ms(600));
        let second = card.set_value(3, t0 + ms(1000)).unwrap();
        assert!(card.fallback_elapsed(first.generation, t0 + ms(1200)).is_none());
        assert!(card.is_flipping());
        card.fallback_elapsed(second.generation, t0 + ms(1600));
        assert_eq!(card.phase(), DigitPhase::Idle(3));
    }

    #[test]
    fn test_retarget_lands_on_latest() {
        let t0 = Instant::now();
        let mut card = cell(5);
        card.set_value(4, t0);
        assert!(card.set_value(3, t0 + ms(100)).is_none());
        assert_eq!(card.phase(), DigitPhase::Flipping { from: 5, to: 3 });

        // The in-flight digit is the one falling away now.
        assert_eq!(card.previous(), 4);
        let frame = card.frame(t0 + ms(150));
        assert_eq!(frame.top_flap.unwrap().digit, 4);
        assert_eq!(frame.bottom_flap.unwrap().digit, 3);
        assert_eq!(frame.bottom, 5);

        card.advance(t0 + ms(600));
        assert_eq!(card.phase(), DigitPhase::Idle(3));
    }

    #[test]
    fn test_retarget_back_to_settled_digit_still_lands() {
        let t0 = Instant::now();
        let mut card = cell(5);
        let flip = card.set_value(4, t0).unwrap();
        assert!(card.set_value(5, t0 + ms(400)).is_none());
        assert_eq!(card.phase(), DigitPhase::Flipping { from: 5, to: 5 });

        // The upper half already shows 4, so 4 falls away and 5 lands.
        let frame = card.frame(t0 + ms(450));
        assert_eq!(frame.top, 5);
        assert_eq!(frame.top_flap.unwrap().digit, 4);
        assert_eq!(frame.bottom_flap.unwrap().digit, 5);

        card.fallback_elapsed(flip.generation, t0 + ms(600));
        assert_eq!(card.phase(), DigitPhase::Idle(5));
        assert_eq!(card.generation(), flip.generation);
    }

    #[test]
    fn test_queue_flips_again_after_settle() {
        let t0 = Instant::now();
        let mut card = cell(5).with_policy(OverlapPolicy::Queue);
        card.set_value(4, t0);
        card.set_value(3, t0 + ms(100));
        assert_eq!(card.target(), 3);
        let next = card.advance(t0 + ms(600)).unwrap();
        assert_eq!((next.from, next.to), (4, 3));
        assert_eq!(card.phase(), DigitPhase::Flipping { from: 4, to: 3 });
        card.advance(t0 + ms(1200));
        assert_eq!(card.phase(), DigitPhase::Idle(3));
    }

    #[test]
    fn test_queue_drops_pending_equal_to_target() {
        let t0 = Instant::now();
        let mut card = cell(5).with_policy(OverlapPolicy::Queue);
        card.set_value(4, t0);
        card.set_value(3, t0 + ms(50));
        card.set_value(4, t0 + ms(100));
        assert!(card.advance(t0 + ms(600)).is_none());
        assert_eq!(card.phase(), DigitPhase::Idle(4));
    }

    #[test]
    fn test_cells_get_unique_ids() {
        assert_ne!(cell(0).id(), cell(0).id());
    }
}
