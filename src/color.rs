//! Packed color codec
//!
//! Palette files and the exported script describe colors as a single 32-bit
//! integer with the channels laid out alpha (most significant), red, green,
//! blue (least significant). Image buffers carry the same channels as
//! interleaved `R, G, B, A` bytes, so this module is the one place where the
//! two orders meet.
//!
//! Color text is accepted the way the palette editor has always read it:
//! - Decimal: `"4278190335"`
//! - Hexadecimal with `0x` prefix: `"0xFF0000FF"`
//! - Bare JSON numbers

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input is not a decimal or `0x` hexadecimal integer
    #[error("invalid color value '{0}'")]
    Invalid(String),
    /// Value does not fit in 32 bits
    #[error("color value '{0}' does not fit in 32 bits")]
    OutOfRange(String),
}

/// A color split into its four 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack into the `0xAARRGGBB` integer form.
    pub const fn pack(self) -> u32 {
        pack(self.r, self.g, self.b, self.a)
    }

    /// Split a packed `0xAARRGGBB` integer into channels.
    pub const fn unpack(packed: u32) -> Self {
        let (r, g, b, a) = unpack(packed);
        Self { r, g, b, a }
    }

    /// Channels in image buffer order.
    pub const fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build from a 4-byte group of an `R, G, B, A` interleaved buffer.
    pub const fn from_rgba(px: [u8; 4]) -> Self {
        Self { r: px[0], g: px[1], b: px[2], a: px[3] }
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        Self::from_rgba(px.0)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba(c.rgba())
    }
}

/// Pack channels into `0xAARRGGBB`.
///
/// Equivalent to `((a * 256 + r) * 256 + g) * 256 + b`.
///
/// ```
/// use fmpalette::color::{pack, unpack};
///
/// let packed = pack(0x12, 0x34, 0x56, 0xFF);
/// assert_eq!(packed, 0xFF123456);
/// assert_eq!(unpack(packed), (0x12, 0x34, 0x56, 0xFF));
/// ```
pub const fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_be_bytes([a, r, g, b])
}

/// Unpack `0xAARRGGBB` into `(r, g, b, a)`.
pub const fn unpack(packed: u32) -> (u8, u8, u8, u8) {
    let [a, r, g, b] = packed.to_be_bytes();
    (r, g, b, a)
}

/// Parse color text into its packed value.
///
/// # Errors
///
/// Returns `ColorError` if the text is empty, not an integer, or wider than
/// 32 bits.
pub fn parse_packed(s: &str) -> Result<u32, ColorError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ColorError::Empty);
    }

    let (digits, radix) = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ColorError::Invalid(s.to_string()));
    }

    u64::from_str_radix(digits, radix)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ColorError::OutOfRange(s.to_string()))
}

/// A color as written in a palette file.
///
/// The source text is kept verbatim so destination colors can be emitted into
/// the generated script exactly as the author wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Text(String),
    Number(u64),
}

impl ColorValue {
    /// Packed value of this color.
    pub fn packed(&self) -> Result<u32, ColorError> {
        match self {
            ColorValue::Text(s) => parse_packed(s),
            ColorValue::Number(n) => {
                u32::try_from(*n).map_err(|_| ColorError::OutOfRange(n.to_string()))
            }
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Text(s) => f.write_str(s),
            ColorValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ColorValue {
    fn from(s: &str) -> Self {
        ColorValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_matches_arithmetic_form() {
        let (r, g, b, a) = (10u32, 20u32, 30u32, 40u32);
        let expected = ((a * 256 + r) * 256 + g) * 256 + b;
        assert_eq!(pack(10, 20, 30, 40), expected);
    }

    #[test]
    fn test_pack_extremes() {
        assert_eq!(pack(0, 0, 0, 0), 0);
        assert_eq!(pack(255, 255, 255, 255), u32::MAX);
        assert_eq!(pack(255, 0, 0, 255), 0xFFFF0000);
        assert_eq!(pack(0, 0, 255, 0), 0x000000FF);
    }

    #[test]
    fn test_color_rgba_order() {
        let c = Color::unpack(0x80112233);
        assert_eq!(c.rgba(), [0x11, 0x22, 0x33, 0x80]);
        assert_eq!(Color::from_rgba(c.rgba()).pack(), 0x80112233);
    }

    #[test]
    fn test_rgba_conversion() {
        let c: Color = Rgba([1, 2, 3, 4]).into();
        assert_eq!(c, Color::new(1, 2, 3, 4));
        let px: Rgba<u8> = c.into();
        assert_eq!(px, Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_packed("4278190335"), Ok(0xFF0000FF));
        assert_eq!(parse_packed(" 0 "), Ok(0));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_packed("0xFF0000FF"), Ok(0xFF0000FF));
        assert_eq!(parse_packed("0Xff"), Ok(0xFF));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_packed(""), Err(ColorError::Empty));
        assert!(matches!(parse_packed("red"), Err(ColorError::Invalid(_))));
        assert!(matches!(parse_packed("0x"), Err(ColorError::Invalid(_))));
        assert!(matches!(parse_packed("-1"), Err(ColorError::Invalid(_))));
        assert!(matches!(parse_packed("4294967296"), Err(ColorError::OutOfRange(_))));
    }

    #[test]
    fn test_color_value_deserialize() {
        let text: ColorValue = serde_json::from_str("\"0xFF00FF00\"").unwrap();
        assert_eq!(text.packed(), Ok(0xFF00FF00));
        assert_eq!(text.to_string(), "0xFF00FF00");

        let number: ColorValue = serde_json::from_str("4278255360").unwrap();
        assert_eq!(number.packed(), Ok(0xFF00FF00));
        assert_eq!(number.to_string(), "4278255360");
    }

    #[test]
    fn test_color_value_number_out_of_range() {
        let number = ColorValue::Number(1 << 40);
        assert!(matches!(number.packed(), Err(ColorError::OutOfRange(_))));
    }

    proptest! {
        #[test]
        fn prop_pack_unpack_round_trip(r: u8, g: u8, b: u8, a: u8) {
            prop_assert_eq!(unpack(pack(r, g, b, a)), (r, g, b, a));
        }

        #[test]
        fn prop_unpack_pack_round_trip(packed: u32) {
            let (r, g, b, a) = unpack(packed);
            prop_assert_eq!(pack(r, g, b, a), packed);
        }

        #[test]
        fn prop_decimal_string_round_trip(packed: u32) {
            prop_assert_eq!(parse_packed(&packed.to_string()), Ok(packed));
        }
    }
}
