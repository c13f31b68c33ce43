//! The flip clock: a countdown engine feeding rows of flip cards.
//!
//! Data flows one way. Each tick the engine produces a [`TimeRemaining`],
//! the visible segments are laid out into digits, and every card is handed
//! its own digit. Cards animate independently; nothing flows back to the
//! engine.

use std::rc::Rc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::animation::{AnimationProfile, AnimationRegistry, FlipKeyframes, ProfileKey};
use crate::config::{FlipClockConfig, SeparatorKind};
use crate::countdown::{CountdownEngine, CountdownSource, TimeRemaining};
use crate::digit::{CardFrame, CellId, DigitCell, FlipStarted, OverlapPolicy};
use crate::segments::{self, LayoutItem, Segment, Segments};
use crate::time::resolve_target;

/// What changed during a tick or a reconfiguration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub remaining: TimeRemaining,
    /// True on the single tick that fired completion
    pub completed: bool,
    /// Flips that began, each needing a fallback timer
    pub flips: Vec<FlipStarted>,
    /// Cards removed from the clock; their pending timers are stale
    pub unmounted: Vec<CellId>,
}

/// Render snapshot of one group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupFrame {
    pub segment: Segment,
    /// Transformed label text, `None` when labels are hidden
    pub label: Option<String>,
    pub cards: Vec<CardFrame>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameItem {
    Group(GroupFrame),
    Separator { kind: SeparatorKind, dots: usize },
}

/// Render snapshot of the whole clock.
#[derive(Clone, Debug, PartialEq)]
pub struct ClockFrame {
    pub remaining: TimeRemaining,
    /// Name prefix of the keyframe rules the cards animate with
    pub animation: ProfileKey,
    pub items: Vec<FrameItem>,
}

impl ClockFrame {
    pub fn groups(&self) -> impl Iterator<Item = &GroupFrame> {
        self.items.iter().filter_map(|item| match item {
            FrameItem::Group(group) => Some(group),
            FrameItem::Separator { .. } => None,
        })
    }

    pub fn is_flipping(&self) -> bool {
        self.groups()
            .flat_map(|group| group.cards.iter())
            .any(CardFrame::is_flipping)
    }
}

struct GroupCells {
    segment: Segment,
    cells: Vec<DigitCell>,
}

pub struct FlipClock {
    config: FlipClockConfig,
    engine: CountdownEngine,
    registry: AnimationRegistry,
    profile: AnimationProfile,
    keyframes: Rc<FlipKeyframes>,
    segments: Segments,
    groups: Vec<GroupCells>,
    remaining: TimeRemaining,
}

impl FlipClock {
    /// Build a clock that shares keyframes through `registry`. `start` is
    /// the instant the default target is measured from.
    pub fn new(config: FlipClockConfig, registry: AnimationRegistry, start: DateTime<Utc>) -> Self {
        let source = match config.static_time {
            Some(time) => CountdownSource::Static(time.into()),
            None => CountdownSource::Target(resolve_target(config.target.as_deref(), start)),
        };
        let profile = config.animation.profile();
        let keyframes = registry.keyframes_for(&profile);
        let segments = config.visible_segments();

        log::debug!(
            "flip clock created: {:?}, segments {:?}, keyframes {}",
            source,
            segments,
            keyframes.key
        );

        Self {
            engine: CountdownEngine::new(source),
            config,
            registry,
            profile,
            keyframes,
            segments,
            groups: Vec::new(),
            remaining: TimeRemaining::ZERO,
        }
    }

    /// Build a clock on the thread-wide keyframe registry.
    pub fn with_global_registry(config: FlipClockConfig, start: DateTime<Utc>) -> Self {
        Self::new(config, AnimationRegistry::global(), start)
    }

    /// Set the callback fired once when the countdown reaches zero.
    pub fn on_complete<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.engine.set_on_complete(Some(Box::new(callback)));
        self
    }

    pub fn config(&self) -> &FlipClockConfig {
        &self.config
    }

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn animation_key(&self) -> &ProfileKey {
        &self.keyframes.key
    }

    pub fn remaining(&self) -> TimeRemaining {
        self.remaining
    }

    pub fn segments(&self) -> Segments {
        self.segments
    }

    /// Static clocks are computed once and never need a tick timer.
    pub fn is_static(&self) -> bool {
        self.engine.is_static()
    }

    /// Recompute the remaining time and hand every card its digit.
    pub fn tick(&mut self, wall: DateTime<Utc>, now: Instant) -> TickReport {
        let outcome = self.engine.tick(wall);
        self.remaining = outcome.remaining;
        let mut report = self.reconcile(now);
        report.completed = outcome.completed;
        report
    }

    /// Count down to a new instant from the next tick on.
    pub fn set_target(&mut self, target: DateTime<Utc>) {
        self.engine.set_target(target);
    }

    /// Re-arm the completion signal, typically after `set_target`.
    pub fn restart(&mut self) {
        self.engine.restart();
    }

    /// Freeze the displayed time and update the cards immediately.
    pub fn set_static_time(&mut self, time: TimeRemaining, now: Instant) -> TickReport {
        self.engine.set_static(time);
        self.tick(Utc::now(), now)
    }

    /// Show a different set of segments. Cards of hidden segments unmount.
    pub fn set_segments(&mut self, segments: Segments, now: Instant) -> TickReport {
        self.segments = segments;
        self.config.segments = segments.into();
        let mut report = self.reconcile(now);
        report.remaining = self.remaining;
        report
    }

    pub fn set_overlap(&mut self, policy: OverlapPolicy) {
        self.config.overlap = policy;
        for cell in self.cells_mut() {
            cell.set_policy(policy);
        }
    }

    fn new_cell(&self, value: u8) -> DigitCell {
        DigitCell::new(value, &self.profile, &self.keyframes).with_policy(self.config.overlap)
    }

    /// Bring the mounted cards in line with the current layout.
    fn reconcile(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport {
            remaining: self.remaining,
            ..TickReport::default()
        };

        let layout = segments::layout(self.segments, &self.remaining, self.config.day_digits);
        let mut previous = std::mem::take(&mut self.groups);
        let mut groups = Vec::with_capacity(layout.len());

        for item in layout {
            let LayoutItem::Group(group) = item else {
                continue;
            };

            let mut cells = match previous.iter().position(|g| g.segment == group.segment) {
                Some(i) => previous.swap_remove(i).cells,
                None => Vec::new(),
            };

            // Digits come and go at the most significant end.
            let wanted = group.digits.len();
            if cells.len() > wanted {
                let excess = cells.len() - wanted;
                report
                    .unmounted
                    .extend(cells.drain(..excess).map(|cell| cell.id()));
            } else if cells.len() < wanted {
                let missing = wanted - cells.len();
                let fresh: Vec<DigitCell> = group.digits[..missing]
                    .iter()
                    .map(|&digit| self.new_cell(digit))
                    .collect();
                cells.splice(0..0, fresh);
            }

            for (cell, &digit) in cells.iter_mut().zip(&group.digits) {
                if let Some(flip) = cell.set_value(digit, now) {
                    report.flips.push(flip);
                }
            }

            groups.push(GroupCells {
                segment: group.segment,
                cells,
            });
        }

        for hidden in previous {
            log::debug!("unmounting {:?} group", hidden.segment);
            report
                .unmounted
                .extend(hidden.cells.iter().map(DigitCell::id));
        }

        self.groups = groups;
        report
    }

    fn cells(&self) -> impl Iterator<Item = &DigitCell> {
        self.groups.iter().flat_map(|group| group.cells.iter())
    }

    fn cells_mut(&mut self) -> impl Iterator<Item = &mut DigitCell> {
        self.groups.iter_mut().flat_map(|group| group.cells.iter_mut())
    }

    pub fn cell_ids(&self) -> Vec<CellId> {
        self.cells().map(DigitCell::id).collect()
    }

    pub fn cell(&self, id: CellId) -> Option<&DigitCell> {
        self.cells().find(|cell| cell.id() == id)
    }

    pub fn is_flipping(&self, id: CellId) -> bool {
        self.cell(id).is_some_and(DigitCell::is_flipping)
    }

    pub fn is_animating(&self) -> bool {
        self.cells().any(DigitCell::is_flipping)
    }

    /// Settle every card whose flip has played out. Returns flips that
    /// started as a result (queued digits).
    pub fn advance(&mut self, now: Instant) -> Vec<FlipStarted> {
        self.cells_mut()
            .filter_map(|cell| cell.advance(now))
            .collect()
    }

    /// Deliver an animation-end notification for one card.
    pub fn animation_end(&mut self, id: CellId, now: Instant) -> Option<FlipStarted> {
        self.cells_mut()
            .find(|cell| cell.id() == id)
            .and_then(|cell| cell.animation_end(now))
    }

    /// A fallback timer fired. Unknown cards and stale generations are
    /// ignored.
    pub fn fallback_elapsed(
        &mut self,
        id: CellId,
        generation: u64,
        now: Instant,
    ) -> Option<FlipStarted> {
        self.cells_mut()
            .find(|cell| cell.id() == id)
            .and_then(|cell| cell.fallback_elapsed(generation, now))
    }

    /// Snapshot of everything a renderer needs at `now`.
    pub fn frame(&self, now: Instant) -> ClockFrame {
        let separator = self.config.separator.kind;
        let label_style = &self.config.label;
        let mut items = Vec::new();

        for group in &self.groups {
            if !items.is_empty() && separator != SeparatorKind::None {
                items.push(FrameItem::Separator {
                    kind: separator,
                    dots: separator.dots(),
                });
            }
            items.push(FrameItem::Group(GroupFrame {
                segment: group.segment,
                label: label_style.visible.then(|| {
                    label_style
                        .text_transform
                        .apply(self.config.labels.get(group.segment))
                }),
                cards: group.cells.iter().map(|cell| cell.frame(now)).collect(),
            }));
        }

        ClockFrame {
            remaining: self.remaining,
            animation: self.keyframes.key.clone(),
            items,
        }
    }

    /// CSS for every keyframe pair registered so far
    pub fn stylesheet(&self) -> String {
        self.registry.stylesheet()
    }
}

impl std::fmt::Debug for FlipClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipClock")
            .field("engine", &self.engine)
            .field("segments", &self.segments)
            .field("animation", &self.keyframes.key)
            .field("remaining", &self.remaining)
            .finish()
    }
}
