//! Color handling for text clips and editing overlays.

use serde::{Deserialize, Serialize};

use crate::error::{MontageError, Result};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGBA components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a `#rrggbb` or `#rrggbbaa` hex string.
    ///
    /// Text color arrives from collaborators as a CSS-style hex value.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return Err(MontageError::InvalidParameter(format!(
                "bad hex color: {hex}"
            )));
        }
        let parse = |range: std::ops::Range<usize>| -> Result<u8> {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| MontageError::InvalidParameter(format!("bad hex color: {hex}")))
        };
        match digits.len() {
            6 => Ok(Self::rgb(parse(0..2)?, parse(2..4)?, parse(4..6)?)),
            8 => Ok(Self::new(
                parse(0..2)?,
                parse(2..4)?,
                parse(4..6)?,
                parse(6..8)?,
            )),
            _ => Err(MontageError::InvalidParameter(format!(
                "bad hex color: {hex}"
            ))),
        }
    }

    /// The same color with a replaced alpha component.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Components as an RGBA byte array.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rgb() {
        let c = Color::from_hex("#ff8040").unwrap();
        assert_eq!(c, Color::rgb(255, 128, 64));
    }

    #[test]
    fn test_from_hex_rgba_and_no_hash() {
        let c = Color::from_hex("10203040").unwrap();
        assert_eq!(c, Color::new(16, 32, 48, 64));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
    }
}
