//! Stroke styling carried on every stroke point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest thickness a renderer will draw.
pub const MIN_THICKNESS: f32 = 1.0;
/// Largest thickness a renderer will draw.
pub const MAX_THICKNESS: f32 = 64.0;
/// Thickness of a freshly opened board.
pub const DEFAULT_THICKNESS: f32 = 5.0;

/// Error returned when a color string is not `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color: {0:?} (expected #rgb or #rrggbb)")]
pub struct ColorParseError(pub String);

/// An opaque RGB color, written as `#rrggbb` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Black, the initial tool color.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White, the default export background.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an RGBA array with full opacity.
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                // #abc expands to #aabbcc
                let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color and thickness of a stroke.
///
/// The engine takes the style as a parameter on every stroke point rather
/// than reading it from shared tool state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Color,
    /// Line width in pixels.
    pub thickness: f32,
}

impl StrokeStyle {
    /// Create a new style.
    #[must_use]
    pub const fn new(color: Color, thickness: f32) -> Self {
        Self { color, thickness }
    }

    /// Thickness clamped to what renderers draw. Non-finite values fall back
    /// to the minimum.
    #[must_use]
    pub fn clamped_thickness(&self) -> f32 {
        if self.thickness.is_finite() {
            self.thickness.clamp(MIN_THICKNESS, MAX_THICKNESS)
        } else {
            MIN_THICKNESS
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(Color::BLACK, DEFAULT_THICKNESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        let color: Color = "#ff0000".parse().expect("should parse");
        assert_eq!(color, Color::rgb(255, 0, 0));
        let color: Color = "#00FF7f".parse().expect("should parse");
        assert_eq!(color, Color::rgb(0, 255, 127));
    }

    #[test]
    fn test_parse_short_hex() {
        let color: Color = "#0f0".parse().expect("should parse");
        assert_eq!(color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("ff0000".parse::<Color>().is_err());
        assert!("#ff00".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        assert_eq!(Color::rgb(255, 10, 0).to_string(), "#ff0a00");
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let json = serde_json::to_string(&Color::rgb(0, 255, 0)).expect("should serialize");
        assert_eq!(json, "\"#00ff00\"");
        let back: Color = serde_json::from_str("\"#00ff00\"").expect("should deserialize");
        assert_eq!(back, Color::rgb(0, 255, 0));
        assert!(serde_json::from_str::<Color>("\"green\"").is_err());
    }

    #[test]
    fn test_thickness_clamp() {
        assert!((StrokeStyle::new(Color::BLACK, 0.0).clamped_thickness() - 1.0).abs() < f32::EPSILON);
        assert!((StrokeStyle::new(Color::BLACK, 500.0).clamped_thickness() - 64.0).abs() < f32::EPSILON);
        assert!((StrokeStyle::new(Color::BLACK, f32::NAN).clamped_thickness() - 1.0).abs() < f32::EPSILON);
        assert!((StrokeStyle::default().clamped_thickness() - 5.0).abs() < f32::EPSILON);
    }
}
