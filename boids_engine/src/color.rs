use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

/// An opaque `#rrggbb` colour as picked in the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        HexColor { r, g, b }
    }

    /// The same colour with the given opacity.
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: alpha.clamp(0., 1.),
        }
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ColorError::Length(s.to_owned()));
        }

        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| ColorError::Digits(s.to_owned()))
        };

        Ok(HexColor {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A translucent colour handed to a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// opacity in [0, 1]
    pub a: f32,
}

impl Rgba {
    /// Channels as floats in [0, 1], the form most graphics backends take.
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.,
            self.g as f32 / 255.,
            self.b as f32 / 255.,
            self.a,
        ]
    }
}

/// CSS style `rgba(r, g, b, a)`
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Converts a `#rrggbb` (or bare `rrggbb`) string into a colour with the given opacity.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> Result<Rgba, ColorError> {
    Ok(hex.parse::<HexColor>()?.with_alpha(alpha))
}

#[cfg(test)]
mod tests {
    use super::{hex_to_rgba, ColorError, HexColor, Rgba};

    #[test]
    fn parses_default_boid_color() {
        let rgba = hex_to_rgba("#558cf4", 0.3).unwrap();
        assert_eq!(
            rgba,
            Rgba {
                r: 0x55,
                g: 0x8c,
                b: 0xf4,
                a: 0.3
            }
        );
        assert_eq!(rgba.to_string(), "rgba(85, 140, 244, 0.3)");
    }

    #[test]
    fn hash_is_optional() {
        assert_eq!(
            "ff0010".parse::<HexColor>().unwrap(),
            HexColor::new(255, 0, 16)
        );
    }

    #[test]
    fn rejects_short_and_non_hex_input() {
        assert_eq!(
            "#fff".parse::<HexColor>(),
            Err(ColorError::Length("#fff".to_owned()))
        );
        assert_eq!(
            "#gg0000".parse::<HexColor>(),
            Err(ColorError::Digits("#gg0000".to_owned()))
        );
        assert!(hex_to_rgba("#12345é", 1.).is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let color = HexColor::new(0x55, 0x8c, 0xf4);
        assert_eq!(color.to_string(), "#558cf4");
        assert_eq!(color.to_string().parse::<HexColor>().unwrap(), color);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(HexColor::new(0, 0, 0).with_alpha(3.).a, 1.);
    }
}
