//! Which time units are shown, and how a value becomes a row of digits.

use bitflags::bitflags;

use crate::countdown::TimeRemaining;

/// One of the four time units
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Segment {
    /// Display order, largest unit first
    pub const ALL: [Segment; 4] = [
        Segment::Days,
        Segment::Hours,
        Segment::Minutes,
        Segment::Seconds,
    ];

    pub fn flag(self) -> Segments {
        match self {
            Segment::Days => Segments::DAYS,
            Segment::Hours => Segments::HOURS,
            Segment::Minutes => Segments::MINUTES,
            Segment::Seconds => Segments::SECONDS,
        }
    }

    pub fn value_of(self, time: &TimeRemaining) -> u64 {
        match self {
            Segment::Days => time.days,
            Segment::Hours => time.hours,
            Segment::Minutes => time.minutes,
            Segment::Seconds => time.seconds,
        }
    }
}

bitflags! {
    /// Set of visible segments
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Segments: u8 {
        const DAYS    = 0b0001;
        const HOURS   = 0b0010;
        const MINUTES = 0b0100;
        const SECONDS = 0b1000;
    }
}

impl Default for Segments {
    fn default() -> Self {
        Segments::all()
    }
}

impl Segments {
    /// Visible segments in display order
    pub fn visible(self) -> impl Iterator<Item = Segment> {
        Segment::ALL
            .into_iter()
            .filter(move |segment| self.contains(segment.flag()))
    }
}

/// Decimal digits of `value`, left-padded with zeros to `width`. Values with
/// more digits than `width` keep all of them.
pub fn digits_of(value: u64, width: usize) -> Vec<u8> {
    format!("{:0width$}", value, width = width.max(1))
        .bytes()
        .map(|b| b - b'0')
        .collect()
}

/// A visible group ready to be drawn
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupLayout {
    pub segment: Segment,
    pub digits: Vec<u8>,
}

/// An element of the clock row
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutItem {
    Group(GroupLayout),
    /// Sits between two visible groups, never before the first
    Separator,
}

/// Lay out the visible groups for `time`. Days use `day_digits` as their
/// minimum width; every other unit uses two digits.
pub fn layout(segments: Segments, time: &TimeRemaining, day_digits: usize) -> Vec<LayoutItem> {
    let mut items = Vec::new();
    for segment in segments.visible() {
        if !items.is_empty() {
            items.push(LayoutItem::Separator);
        }
        let width = match segment {
            Segment::Days => day_digits,
            _ => 2,
        };
        items.push(LayoutItem::Group(GroupLayout {
            segment,
            digits: digits_of(segment.value_of(time), width),
        }));
    }
    items
}
