use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration as StdDuration, Instant};

use chrono::{Duration, TimeZone, Utc};
use flipclock::prelude::*;

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn digits(frame: &ClockFrame, segment: Segment) -> Vec<u8> {
    frame
        .groups()
        .find(|group| group.segment == segment)
        .map(|group| group.cards.iter().map(|card| card.bottom).collect())
        .unwrap_or_default()
}

#[test]
fn test_ninety_seconds_out() {
    let now = start();
    let config = FlipClockConfig::new().target(now + Duration::seconds(90));
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);

    let report = clock.tick(now, Instant::now());
    assert_eq!(report.remaining, TimeRemaining::new(0, 0, 1, 30));
    assert!(!report.completed);
    assert!(report.flips.is_empty());

    let frame = clock.frame(Instant::now());
    assert_eq!(digits(&frame, Segment::Days), vec![0, 0]);
    assert_eq!(digits(&frame, Segment::Hours), vec![0, 0]);
    assert_eq!(digits(&frame, Segment::Minutes), vec![0, 1]);
    assert_eq!(digits(&frame, Segment::Seconds), vec![3, 0]);
}

#[test]
fn test_past_target_completes_once() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let now = start();
    let config = FlipClockConfig::new().target(now - Duration::minutes(5));
    let mut clock =
        FlipClock::new(config, AnimationRegistry::new(), now).on_complete(move || {
            counter.set(counter.get() + 1);
        });

    let first = clock.tick(now, Instant::now());
    assert_eq!(first.remaining, TimeRemaining::ZERO);
    assert!(first.completed);

    for i in 1..5 {
        let report = clock.tick(now + Duration::seconds(i), Instant::now());
        assert_eq!(report.remaining, TimeRemaining::ZERO);
        assert!(!report.completed);
    }
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_countdown_reaching_zero_completes_once() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let now = start();
    let config = FlipClockConfig::new().target(now + Duration::seconds(3));
    let mut clock =
        FlipClock::new(config, AnimationRegistry::new(), now).on_complete(move || {
            counter.set(counter.get() + 1);
        });

    let completions: Vec<bool> = (0..6)
        .map(|i| clock.tick(now + Duration::seconds(i), Instant::now()).completed)
        .collect();
    assert_eq!(completions, vec![false, false, false, true, false, false]);
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_static_time_never_ticks() {
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    let config = FlipClockConfig::from_json(r#"{"static_time": {"seconds": 42}}"#).unwrap();
    let mut clock =
        FlipClock::new(config, AnimationRegistry::new(), start()).on_complete(move || {
            flag.set(true);
        });
    assert!(clock.is_static());

    for i in 0..10 {
        let report = clock.tick(start() + Duration::days(i), Instant::now());
        assert_eq!(report.remaining, TimeRemaining::new(0, 0, 0, 42));
        assert!(report.flips.is_empty());
    }
    assert!(!fired.get());
}

#[test]
fn test_static_zero_does_not_complete() {
    let config = FlipClockConfig::new().static_time(StaticTime::default());
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), start());
    let report = clock.tick(start(), Instant::now());
    assert_eq!(report.remaining, TimeRemaining::ZERO);
    assert!(!report.completed);
}

#[test]
fn test_hidden_days_has_no_leading_separator() {
    let now = start();
    let config = FlipClockConfig::new()
        .target(now + Duration::days(3) + Duration::hours(4))
        .segments(Segments::HOURS | Segments::MINUTES | Segments::SECONDS)
        .separator(SeparatorConfig {
            kind: SeparatorKind::Colon,
            ..SeparatorConfig::default()
        });
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
    clock.tick(now, Instant::now());

    let frame = clock.frame(Instant::now());
    let shape: Vec<Option<Segment>> = frame
        .items
        .iter()
        .map(|item| match item {
            FrameItem::Group(group) => Some(group.segment),
            FrameItem::Separator { .. } => None,
        })
        .collect();
    assert_eq!(
        shape,
        vec![
            Some(Segment::Hours),
            None,
            Some(Segment::Minutes),
            None,
            Some(Segment::Seconds),
        ]
    );
    // Hidden days do not fold into hours.
    assert_eq!(digits(&frame, Segment::Hours), vec![0, 4]);
}

#[test]
fn test_labels_follow_text_transform() {
    let now = start();
    let config = FlipClockConfig::new()
        .target(now + Duration::hours(1))
        .segments(Segments::MINUTES);
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
    clock.tick(now, Instant::now());

    let frame = clock.frame(Instant::now());
    let labels: Vec<Option<String>> = frame.groups().map(|group| group.label.clone()).collect();
    assert_eq!(labels, vec![Some("MINUTES".to_string())]);
}

#[test]
fn test_nine_to_zero_flips_then_settles() {
    let profile = AnimationProfile::default();
    let registry = AnimationRegistry::new();
    let keyframes = registry.keyframes_for(&profile);
    let t0 = Instant::now();

    let mut cell = DigitCell::new(9, &profile, &keyframes);
    let flip = cell.set_value(0, t0).expect("flip should start");
    assert_eq!((flip.from, flip.to), (9, 0));
    assert_eq!(flip.fallback, StdDuration::from_millis(600));
    assert_eq!(cell.phase(), DigitPhase::Flipping { from: 9, to: 0 });

    assert_eq!(cell.advance(t0 + StdDuration::from_millis(599)), None);
    assert!(cell.is_flipping());

    cell.advance(t0 + StdDuration::from_millis(600));
    assert_eq!(cell.phase(), DigitPhase::Idle(0));
    assert_eq!(cell.previous(), 9);
}

#[test]
fn test_seconds_rollover_flips_both_cards() {
    let now = start();
    let config = FlipClockConfig::new()
        .target(now + Duration::seconds(10))
        .segments(Segments::SECONDS);
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
    let t0 = Instant::now();
    clock.tick(now, t0);

    let report = clock.tick(now + Duration::seconds(1), t0);
    let mut changes: Vec<(u8, u8)> = report.flips.iter().map(|f| (f.from, f.to)).collect();
    changes.sort();
    assert_eq!(changes, vec![(0, 9), (1, 0)]);
    assert!(clock.is_animating());

    clock.advance(t0 + StdDuration::from_millis(600));
    assert!(!clock.is_animating());
    assert_eq!(digits(&clock.frame(t0), Segment::Seconds), vec![0, 9]);
}

#[test]
fn test_unchanged_digits_do_not_flip() {
    let now = start();
    let config = FlipClockConfig::new().target(now + Duration::minutes(10));
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
    let t0 = Instant::now();
    clock.tick(now, t0);

    // 10:00 -> 09:59 changes all four minute and second cards.
    let report = clock.tick(now + Duration::seconds(1), t0);
    assert_eq!(report.flips.len(), 4);
    let flipping: Vec<CellId> = report.flips.iter().map(|f| f.cell).collect();
    for id in clock.cell_ids() {
        assert_eq!(clock.is_flipping(id), flipping.contains(&id));
    }
}

#[test]
fn test_clocks_share_keyframes() {
    let registry = AnimationRegistry::new();
    let a = FlipClock::new(FlipClockConfig::new(), registry.clone(), start());
    let b = FlipClock::new(FlipClockConfig::new(), registry.clone(), start());
    assert_eq!(a.animation_key(), b.animation_key());
    assert_eq!(registry.len(), 1);

    let bouncy = FlipClockConfig::new().animation(AnimationConfig {
        bounce_degrees: 12.5,
        ..AnimationConfig::default()
    });
    let c = FlipClock::new(bouncy, registry.clone(), start());
    assert_eq!(c.animation_key().as_str(), "fc-300-12_5");
    assert_eq!(registry.len(), 2);

    let css = c.stylesheet();
    assert!(css.contains("@keyframes fc-300-8-flip-top"));
    assert!(css.contains("@keyframes fc-300-12_5-flip-bottom"));
}

#[test]
fn test_days_grow_beyond_minimum_width() {
    let now = start();
    let config = FlipClockConfig::new()
        .target(now + Duration::days(123))
        .segments(Segments::DAYS);
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
    let t0 = Instant::now();
    clock.tick(now, t0);
    assert_eq!(digits(&clock.frame(t0), Segment::Days), vec![1, 2, 3]);
    let ids = clock.cell_ids();

    // Crossing below 100 days drops the leading card.
    let report = clock.tick(now + Duration::days(24), t0);
    assert_eq!(report.unmounted, vec![ids[0]]);
    assert_eq!(clock.cell_ids(), ids[1..].to_vec());

    let settled = t0 + StdDuration::from_secs(1);
    clock.advance(settled);
    assert_eq!(digits(&clock.frame(settled), Segment::Days), vec![9, 9]);
}

#[test]
fn test_decomposition_is_consistent() {
    let now = start();
    for offset_ms in [0i64, 999, 1_000, 59_999, 3_600_000, 86_399_999, 90_061_001] {
        let config = FlipClockConfig::new().target(now + Duration::milliseconds(offset_ms));
        let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
        let remaining = clock.tick(now, Instant::now()).remaining;

        assert!(remaining.hours < 24 && remaining.minutes < 60 && remaining.seconds < 60);
        assert_eq!(remaining.total_ms(), offset_ms / 1000 * 1000);
    }
}

#[test]
fn test_unparseable_target_uses_default() {
    let now = start();
    let config = FlipClockConfig::new().target_str("not a date");
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), now);
    let report = clock.tick(now, Instant::now());
    assert_eq!(report.remaining, TimeRemaining::new(88, 14, 0, 0));
}

#[test]
fn test_restart_rearms_completion() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let now = start();
    let config = FlipClockConfig::new().target(now);
    let mut clock =
        FlipClock::new(config, AnimationRegistry::new(), now).on_complete(move || {
            counter.set(counter.get() + 1);
        });
    assert!(clock.tick(now, Instant::now()).completed);

    // A new target alone does not fire again.
    clock.set_target(now + Duration::seconds(2));
    clock.tick(now, Instant::now());
    assert!(!clock.tick(now + Duration::seconds(2), Instant::now()).completed);

    clock.restart();
    clock.set_target(now + Duration::seconds(5));
    assert!(!clock.tick(now + Duration::seconds(4), Instant::now()).completed);
    assert!(clock.tick(now + Duration::seconds(5), Instant::now()).completed);
    assert_eq!(fired.get(), 2);
}

#[test]
fn test_wide_static_minutes_render_three_cards() {
    let config = FlipClockConfig::from_json(r#"{"static_time": {"minutes": 300}}"#).unwrap();
    let mut clock = FlipClock::new(config, AnimationRegistry::new(), start());
    let report = clock.tick(start(), Instant::now());
    assert_eq!(report.remaining, TimeRemaining::new(0, 0, 300, 0));

    let frame = clock.frame(Instant::now());
    assert_eq!(digits(&frame, Segment::Minutes), vec![3, 0, 0]);
    assert_eq!(digits(&frame, Segment::Seconds), vec![0, 0]);
}
