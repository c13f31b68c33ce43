//! Style values: colors, lengths and shadows.
//!
//! Each type parses from the CSS spelling a stylesheet would use, so a
//! configuration file can say `"#1a1a2e"`, `"7rem"` or
//! `"0 3px 8px rgba(0,0,0,0.25)"`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Channels as 0-255 integers, alpha unchanged
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` and a few keywords.
    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let invalid = || Error::InvalidColor(input.to_string());

        match input.to_ascii_lowercase().as_str() {
            "white" => return Ok(Color::WHITE),
            "black" => return Ok(Color::BLACK),
            "transparent" => return Ok(Color::TRANSPARENT),
            _ => {}
        }

        if let Some(hex) = input.strip_prefix('#') {
            let digits = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
                6 | 8 => hex.to_string(),
                _ => return Err(invalid()),
            };
            let value = u32::from_str_radix(&digits, 16).map_err(|_| invalid())?;
            return Ok(if digits.len() == 8 {
                let mut color = Color::from_hex(value >> 8);
                color.a = (value & 0xFF) as f32 / 255.0;
                color
            } else {
                Color::from_hex(value)
            });
        }

        let args = input
            .strip_prefix("rgba(")
            .or_else(|| input.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let parts = args
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        match parts[..] {
            [r, g, b] => Ok(Color::rgb(r / 255.0, g / 255.0, b / 255.0)),
            [r, g, b, a] => Ok(Color::rgba(r / 255.0, g / 255.0, b / 255.0, a)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", r, g, b, self.a)
        }
    }
}

/// Unit of a [`Length`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Px,
    Rem,
    Em,
    Percent,
}

/// A CSS length such as `7rem` or `1px`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub const ZERO: Length = Length::px(0.0);

    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Px,
        }
    }

    pub const fn rem(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Rem,
        }
    }

    pub const fn em(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Em,
        }
    }

    /// Resolve to logical pixels. `em` resolves against `font_px`,
    /// percentages against `basis_px`.
    pub fn to_px(&self, root_font_px: f32, font_px: f32, basis_px: f32) -> f32 {
        match self.unit {
            Unit::Px => self.value,
            Unit::Rem => self.value * root_font_px,
            Unit::Em => self.value * font_px,
            Unit::Percent => self.value / 100.0 * basis_px,
        }
    }
}

impl FromStr for Length {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let invalid = || Error::InvalidLength(input.to_string());

        let split = input
            .find(|c: char| c.is_ascii_alphabetic() || c == '%')
            .unwrap_or(input.len());
        let (number, unit) = input.split_at(split);
        let value: f32 = number.trim().parse().map_err(|_| invalid())?;
        let unit = match unit {
            "px" => Unit::Px,
            "rem" => Unit::Rem,
            "em" => Unit::Em,
            "%" => Unit::Percent,
            "" if value == 0.0 => Unit::Px,
            _ => return Err(invalid()),
        };
        Ok(Self { value, unit })
    }
}

impl TryFrom<String> for Length {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            Unit::Px => "px",
            Unit::Rem => "rem",
            Unit::Em => "em",
            Unit::Percent => "%",
        };
        write!(f, "{}{}", self.value, unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Shadow offset (x, y)
    pub offset: (Length, Length),
    /// Blur radius
    pub blur: Length,
    /// Spread amount (expands shadow)
    pub spread: Length,
    /// Shadow color
    pub color: Color,
}

impl Shadow {
    /// Create a shadow with no spread
    pub fn simple(offset: (f32, f32), blur: f32, color: Color) -> Self {
        Self {
            offset: (Length::px(offset.0), Length::px(offset.1)),
            blur: Length::px(blur),
            spread: Length::ZERO,
            color,
        }
    }
}

/// A stack of shadow layers; empty means `none`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Shadows(pub Vec<Shadow>);

impl Shadows {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split on `sep` outside parentheses
fn split_top_level(input: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && sep(c) => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

impl FromStr for Shadows {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.is_empty() || input == "none" {
            return Ok(Shadows::none());
        }

        let mut layers = Vec::new();
        for layer in split_top_level(input, |c| c == ',') {
            let mut lengths = Vec::new();
            let mut color = Color::rgba(0.0, 0.0, 0.0, 1.0);
            for token in split_top_level(layer, char::is_whitespace) {
                match token.parse::<Length>() {
                    Ok(length) => lengths.push(length),
                    Err(_) => color = token.parse()?,
                }
            }
            let [x, y, rest @ ..] = lengths.as_slice() else {
                return Err(Error::InvalidLength(layer.to_string()));
            };
            layers.push(Shadow {
                offset: (*x, *y),
                blur: rest.first().copied().unwrap_or(Length::ZERO),
                spread: rest.get(1).copied().unwrap_or(Length::ZERO),
                color,
            });
        }
        Ok(Shadows(layers))
    }
}

impl TryFrom<String> for Shadows {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Shadows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        let layers: Vec<String> = self
            .0
            .iter()
            .map(|s| format!("{} {} {} {} {}", s.offset.0, s.offset.1, s.blur, s.spread, s.color))
            .collect();
        write!(f, "{}", layers.join(", "))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    None,
    #[default]
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
