//! Data structures shared between the protocol and client layers.

use crate::error::{Error, Result};

/// A firmware version number extracted from the device's banner.
pub type VersionNumber = u32;

/// One of the 5 independent key-binding sets on the device.
///
/// The device never creates or destroys profiles; messages only select
/// which of the fixed slots they apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Profile(u8);

impl Profile {
    /// Creates a profile for the given slot (0..=4).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the slot is out of range.
    pub fn new(slot: u8) -> Result<Self> {
        if slot > 4 {
            return Err(Error::Validation {
                reason: format!("profile slot {slot} out of range (0-4)"),
            });
        }
        Ok(Self(slot))
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn slot(self) -> u8 {
        self.0
    }

    /// Returns the wire representation, an ASCII digit `'0'..='4'`.
    #[must_use]
    pub const fn as_char(self) -> char {
        (b'0' + self.0) as char
    }
}

/// A physical key within a profile (1..=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyIndex(u8);

impl KeyIndex {
    /// Creates a key index for the given key number (1..=8).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key number is out of range.
    pub fn new(key: u8) -> Result<Self> {
        if !(1..=8).contains(&key) {
            return Err(Error::Validation {
                reason: format!("key index {key} out of range (1-8)"),
            });
        }
        Ok(Self(key))
    }

    /// Returns the key number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Returns the wire representation, an ASCII digit `'1'..='8'`.
    #[must_use]
    pub const fn as_char(self) -> char {
        (b'0' + self.0) as char
    }
}

/// An RGB color for the key backlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LedColor {
    /// Creates a color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"RRGGBB"` hex text, with or without a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the text is not 6 hex digits.
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let channel = |lo: usize| u8::from_str_radix(&hex[lo..lo + 2], 16);
            if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                return Ok(Self { r, g, b });
            }
        }
        Err(Error::Validation {
            reason: format!("invalid hex color {text:?}"),
        })
    }

    /// Returns the 6-character lowercase hex form used on the wire.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_range() {
        assert!(Profile::new(0).is_ok());
        assert!(Profile::new(4).is_ok());
        assert!(Profile::new(5).is_err());
        assert_eq!(Profile::new(2).unwrap().as_char(), '2');
    }

    #[test]
    fn test_key_index_range() {
        assert!(KeyIndex::new(0).is_err());
        assert!(KeyIndex::new(1).is_ok());
        assert!(KeyIndex::new(8).is_ok());
        assert!(KeyIndex::new(9).is_err());
        assert_eq!(KeyIndex::new(3).unwrap().as_char(), '3');
    }

    #[test]
    fn test_led_color_from_hex() {
        let color = LedColor::from_hex("#FF8800").unwrap();
        assert_eq!(color, LedColor::new(0xFF, 0x88, 0x00));
        assert_eq!(LedColor::from_hex("ff8800").unwrap(), color);
        assert_eq!(color.to_hex(), "ff8800");
    }

    #[test]
    fn test_led_color_rejects_bad_hex() {
        assert!(LedColor::from_hex("#ff880").is_err());
        assert!(LedColor::from_hex("gg8800").is_err());
        assert!(LedColor::from_hex("#+f8800").is_err());
    }
}
