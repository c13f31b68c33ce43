//! Clock configuration.
//!
//! Every field has a default matching the classic dark-card look. Nested
//! style objects merge shallowly: a partial `card` object only replaces the
//! fields it names.
//!
//! ```
//! use flipclock::config::FlipClockConfig;
//!
//! let config = FlipClockConfig::from_json(r##"{
//!     "card": { "background": "#1e1e2e" },
//!     "animation": { "bounce_degrees": 15 },
//!     "separator": { "type": "colon" }
//! }"##).unwrap();
//!
//! assert_eq!(config.card.background.to_string(), "#1e1e2e");
//! assert_eq!(config.card.background_dark.to_string(), "#4a4a4a");
//! assert_eq!(config.animation.flip_duration_ms, 300);
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::animation::registry::{DEFAULT_BOUNCE_DEGREES, DEFAULT_FLIP_DURATION_MS};
use crate::animation::{AnimationProfile, TimingFunction};
use crate::countdown::StaticTime;
use crate::digit::OverlapPolicy;
use crate::error::Result;
use crate::segments::{Segment, Segments};
use crate::style::{Color, Length, Shadow, Shadows, TextTransform};

/// Implements `Deserialize` for a config struct so that every key is read on
/// its own. A value that does not parse keeps the field's default and logs a
/// warning; missing and unknown keys are ignored.
macro_rules! lenient_config {
    ($ty:ident { $($key:literal => $field:ident),* $(,)? }) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
                let mut config = Self::default();
                for (key, value) in raw {
                    match key.as_str() {
                        $($key => match serde_json::from_value(value) {
                            Ok(parsed) => config.$field = parsed,
                            Err(err) => log::warn!(
                                "ignoring {}.{}: {}, keeping the default",
                                stringify!($ty),
                                $key,
                                err
                            ),
                        },)*
                        other => log::debug!("unknown {} key {:?}", stringify!($ty), other),
                    }
                }
                Ok(config)
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardStyle {
    /// Upper half background
    pub background: Color,
    /// Lower half background, usually a little darker
    pub background_dark: Color,
    pub width: Length,
    pub height: Length,
    pub border_radius: Length,
    pub box_shadow: Shadows,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            background: Color::from_hex(0x575757),
            background_dark: Color::from_hex(0x4a4a4a),
            width: Length::rem(7.0),
            height: Length::rem(9.5),
            border_radius: Length::rem(0.5),
            box_shadow: Shadows(vec![
                Shadow::simple((0.0, 3.0), 8.0, Color::rgba(0.0, 0.0, 0.0, 0.25)),
                Shadow::simple((0.0, 1.0), 3.0, Color::rgba(0.0, 0.0, 0.0, 0.15)),
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DigitStyle {
    pub color: Color,
    pub font_family: String,
    pub font_size: Length,
    pub text_shadow: Shadows,
}

impl Default for DigitStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            font_family: "'Bebas Neue', sans-serif".to_string(),
            font_size: Length::rem(5.5),
            text_shadow: Shadows::none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub visible: bool,
    pub color: Color,
    pub font_family: String,
    pub font_size: Length,
    pub font_weight: u16,
    pub letter_spacing: Length,
    pub text_transform: TextTransform,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            visible: true,
            color: Color::from_hex(0x999999),
            font_family: "'Inter', sans-serif".to_string(),
            font_size: Length::rem(0.9),
            font_weight: 500,
            letter_spacing: Length::em(0.2),
            text_transform: TextTransform::Uppercase,
        }
    }
}

/// The divider across the middle of each card
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub height: Length,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::rgba(0.0, 0.0, 0.0, 0.25),
            height: Length::px(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Duration of each half-flip in milliseconds
    pub flip_duration_ms: u32,
    /// Bounce overshoot angle in degrees (0 = no bounce)
    pub bounce_degrees: f32,
    /// CSS easing of the falling top flap
    pub flip_down_easing: String,
    /// CSS easing of the landing bottom flap
    pub flip_up_easing: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            flip_duration_ms: DEFAULT_FLIP_DURATION_MS,
            bounce_degrees: DEFAULT_BOUNCE_DEGREES,
            flip_down_easing: "ease-in".to_string(),
            flip_up_easing: "ease-out".to_string(),
        }
    }
}

impl AnimationConfig {
    /// Resolve easing strings; unknown curves fall back to the defaults.
    pub fn profile(&self) -> AnimationProfile {
        AnimationProfile {
            flip_duration_ms: self.flip_duration_ms,
            bounce_degrees: self.bounce_degrees,
            flip_down_easing: TimingFunction::parse_or(
                &self.flip_down_easing,
                TimingFunction::EaseIn,
            ),
            flip_up_easing: TimingFunction::parse_or(&self.flip_up_easing, TimingFunction::EaseOut),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorKind {
    #[default]
    None,
    Colon,
    Dot,
}

impl SeparatorKind {
    /// Number of dots drawn
    pub fn dots(self) -> usize {
        match self {
            SeparatorKind::None => 0,
            SeparatorKind::Colon => 2,
            SeparatorKind::Dot => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeparatorConfig {
    /// Read from the `type` key
    pub kind: SeparatorKind,
    pub color: Color,
    /// Dot diameter, also the gap between the two dots of a colon
    pub size: Length,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            kind: SeparatorKind::None,
            color: Color::from_hex(0x999999),
            size: Length::rem(0.5),
        }
    }
}

/// Label text for each unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            days: "Days".to_string(),
            hours: "Hours".to_string(),
            minutes: "Minutes".to_string(),
            seconds: "Seconds".to_string(),
        }
    }
}

impl Labels {
    pub fn get(&self, segment: Segment) -> &str {
        match segment {
            Segment::Days => &self.days,
            Segment::Hours => &self.hours,
            Segment::Minutes => &self.minutes,
            Segment::Seconds => &self.seconds,
        }
    }
}

/// Per-segment visibility as it appears in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentToggles {
    pub days: bool,
    pub hours: bool,
    pub minutes: bool,
    pub seconds: bool,
}

impl Default for SegmentToggles {
    fn default() -> Self {
        Self {
            days: true,
            hours: true,
            minutes: true,
            seconds: true,
        }
    }
}

impl From<SegmentToggles> for Segments {
    fn from(toggles: SegmentToggles) -> Self {
        let mut segments = Segments::empty();
        segments.set(Segments::DAYS, toggles.days);
        segments.set(Segments::HOURS, toggles.hours);
        segments.set(Segments::MINUTES, toggles.minutes);
        segments.set(Segments::SECONDS, toggles.seconds);
        segments
    }
}

impl From<Segments> for SegmentToggles {
    fn from(segments: Segments) -> Self {
        Self {
            days: segments.contains(Segments::DAYS),
            hours: segments.contains(Segments::HOURS),
            minutes: segments.contains(Segments::MINUTES),
            seconds: segments.contains(Segments::SECONDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlipClockConfig {
    /// Target instant; unparseable or missing means the default target
    pub target: Option<String>,
    /// Frozen time, disables ticking
    pub static_time: Option<StaticTime>,
    pub card: CardStyle,
    pub digit: DigitStyle,
    pub label: LabelStyle,
    pub line: LineStyle,
    pub animation: AnimationConfig,
    pub separator: SeparatorConfig,
    pub labels: Labels,
    pub segments: SegmentToggles,
    /// Minimum number of digits for days
    pub day_digits: usize,
    pub group_gap: Length,
    pub card_gap: Length,
    pub label_gap: Length,
    /// What a card does with a digit that arrives mid-flip
    pub overlap: OverlapPolicy,
    /// Passed through to the outer container
    pub class_name: Option<String>,
    /// Extra style properties for the outer container
    pub container_style: BTreeMap<String, String>,
}

impl Default for FlipClockConfig {
    fn default() -> Self {
        Self {
            target: None,
            static_time: None,
            card: CardStyle::default(),
            digit: DigitStyle::default(),
            label: LabelStyle::default(),
            line: LineStyle::default(),
            animation: AnimationConfig::default(),
            separator: SeparatorConfig::default(),
            labels: Labels::default(),
            segments: SegmentToggles::default(),
            day_digits: 2,
            group_gap: Length::rem(3.0),
            card_gap: Length::rem(0.375),
            label_gap: Length::rem(1.0),
            overlap: OverlapPolicy::default(),
            class_name: None,
            container_style: BTreeMap::new(),
        }
    }
}

lenient_config!(CardStyle {
    "background" => background,
    "background_dark" => background_dark,
    "width" => width,
    "height" => height,
    "border_radius" => border_radius,
    "box_shadow" => box_shadow,
});

lenient_config!(DigitStyle {
    "color" => color,
    "font_family" => font_family,
    "font_size" => font_size,
    "text_shadow" => text_shadow,
});

lenient_config!(LabelStyle {
    "visible" => visible,
    "color" => color,
    "font_family" => font_family,
    "font_size" => font_size,
    "font_weight" => font_weight,
    "letter_spacing" => letter_spacing,
    "text_transform" => text_transform,
});

lenient_config!(LineStyle {
    "color" => color,
    "height" => height,
});

lenient_config!(AnimationConfig {
    "flip_duration_ms" => flip_duration_ms,
    "bounce_degrees" => bounce_degrees,
    "flip_down_easing" => flip_down_easing,
    "flip_up_easing" => flip_up_easing,
});

lenient_config!(SeparatorConfig {
    "type" => kind,
    "color" => color,
    "size" => size,
});

lenient_config!(Labels {
    "days" => days,
    "hours" => hours,
    "minutes" => minutes,
    "seconds" => seconds,
});

lenient_config!(SegmentToggles {
    "days" => days,
    "hours" => hours,
    "minutes" => minutes,
    "seconds" => seconds,
});

lenient_config!(FlipClockConfig {
    "target" => target,
    "static_time" => static_time,
    "card" => card,
    "digit" => digit,
    "label" => label,
    "line" => line,
    "animation" => animation,
    "separator" => separator,
    "labels" => labels,
    "segments" => segments,
    "day_digits" => day_digits,
    "group_gap" => group_gap,
    "card_gap" => card_gap,
    "label_gap" => label_gap,
    "overlap" => overlap,
    "class_name" => class_name,
    "container_style" => container_style,
});

impl FlipClockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON configuration. Only malformed JSON
    /// or a document that is not an object is an error; bad values fall
    /// back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn target(mut self, target: DateTime<Utc>) -> Self {
        self.target = Some(target.to_rfc3339());
        self
    }

    pub fn target_str(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn static_time(mut self, time: StaticTime) -> Self {
        self.static_time = Some(time);
        self
    }

    pub fn card(mut self, card: CardStyle) -> Self {
        self.card = card;
        self
    }

    pub fn digit(mut self, digit: DigitStyle) -> Self {
        self.digit = digit;
        self
    }

    pub fn label(mut self, label: LabelStyle) -> Self {
        self.label = label;
        self
    }

    pub fn line(mut self, line: LineStyle) -> Self {
        self.line = line;
        self
    }

    pub fn animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn separator(mut self, separator: SeparatorConfig) -> Self {
        self.separator = separator;
        self
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn segments(mut self, segments: Segments) -> Self {
        self.segments = segments.into();
        self
    }

    pub fn day_digits(mut self, digits: usize) -> Self {
        self.day_digits = digits;
        self
    }

    pub fn group_gap(mut self, gap: Length) -> Self {
        self.group_gap = gap;
        self
    }

    pub fn card_gap(mut self, gap: Length) -> Self {
        self.card_gap = gap;
        self
    }

    pub fn label_gap(mut self, gap: Length) -> Self {
        self.label_gap = gap;
        self
    }

    pub fn overlap(mut self, policy: OverlapPolicy) -> Self {
        self.overlap = policy;
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn container_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.container_style.insert(property.into(), value.into());
        self
    }

    pub fn visible_segments(&self) -> Segments {
        self.segments.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(FlipClockConfig::from_json("{}").unwrap(), FlipClockConfig::default());
    }

    #[test]
    fn test_partial_objects_merge_per_field() {
        let config = FlipClockConfig::from_json(
            r##"{
                "digit": { "color": "#cba6f7", "font_size": "4rem" },
                "labels": { "days": "Tage" },
                "segments": { "days": false },
                "day_digits": 3
            }"##,
        )
        .unwrap();

        assert_eq!(config.digit.color, "#cba6f7".parse().unwrap());
        assert_eq!(config.digit.font_size, Length::rem(4.0));
        assert_eq!(config.digit.font_family, "'Bebas Neue', sans-serif");
        assert_eq!(config.labels.days, "Tage");
        assert_eq!(config.labels.hours, "Hours");
        assert_eq!(config.visible_segments(), Segments::all() - Segments::DAYS);
        assert_eq!(config.day_digits, 3);
    }

    #[test]
    fn test_bad_values_fall_back_per_field() {
        let config = FlipClockConfig::from_json(
            r##"{
                "card": { "background": "hsl(0, 0%, 10%)", "width": "wide", "height": "8rem" },
                "label": { "visible": "yes", "color": "#fff" },
                "overlap": "sometimes",
                "day_digits": 3
            }"##,
        )
        .unwrap();

        let defaults = FlipClockConfig::default();
        assert_eq!(config.card.background, defaults.card.background);
        assert_eq!(config.card.width, defaults.card.width);
        assert_eq!(config.card.height, Length::rem(8.0));
        assert!(config.label.visible);
        assert_eq!(config.label.color, Color::WHITE);
        assert_eq!(config.overlap, OverlapPolicy::Retarget);
        assert_eq!(config.day_digits, 3);
    }

    #[test]
    fn test_wrong_shape_keeps_section_default() {
        let config =
            FlipClockConfig::from_json(r#"{ "card": 5, "labels": { "days": "Tage" } }"#).unwrap();
        assert_eq!(config.card, CardStyle::default());
        assert_eq!(config.labels.days, "Tage");
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(FlipClockConfig::from_json("{ \"card\": ").is_err());
        assert!(FlipClockConfig::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_card_shadow_parses() {
        let config = FlipClockConfig::from_json(r#"{ "card": { "box_shadow": "none" } }"#).unwrap();
        assert!(config.card.box_shadow.is_none());
    }

    #[test]
    fn test_separator_and_overlap() {
        let config = FlipClockConfig::from_json(
            r##"{ "separator": { "type": "dot", "color": "#fff" }, "overlap": "queue" }"##,
        )
        .unwrap();
        assert_eq!(config.separator.kind, SeparatorKind::Dot);
        assert_eq!(config.separator.kind.dots(), 1);
        assert_eq!(config.separator.size, Length::rem(0.5));
        assert_eq!(config.overlap, OverlapPolicy::Queue);
    }

    #[test]
    fn test_bad_easing_falls_back() {
        let animation = AnimationConfig {
            flip_up_easing: "wobbly".to_string(),
            ..AnimationConfig::default()
        };
        let profile = animation.profile();
        assert!(matches!(profile.flip_up_easing, TimingFunction::EaseOut));
        assert!(matches!(profile.flip_down_easing, TimingFunction::EaseIn));
    }

    #[test]
    fn test_static_time_partial() {
        let config = FlipClockConfig::from_json(r#"{ "static_time": { "seconds": 42 } }"#).unwrap();
        assert_eq!(
            config.static_time,
            Some(StaticTime {
                seconds: Some(42),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_builder_segments_round_trip() {
        let config = FlipClockConfig::new().segments(Segments::MINUTES | Segments::SECONDS);
        assert!(!config.segments.days);
        assert!(config.segments.seconds);
    }
}
