//! Frame encoding for the EZB macro-pad protocol.
//!
//! The wire format is a compact text frame:
//! ```text
//! ┌─────────┬──────────────┬────────────┬───────────┐
//! │  "ebf"  │ length digit │ type digit │   body    │
//! │ 3 chars │    1 char    │   1 char   │  n chars  │
//! └─────────┴──────────────┴────────────┴───────────┘
//! ```
//! The length digit encodes `total frame length - 4` (magic and the length
//! position itself excluded) as one base-10 digit, patched into offset 3
//! after the body is assembled. A frame whose length code would need more
//! than one digit cannot be represented on this device; [`ConfigMessage::encode`]
//! refuses it instead of silently widening the field.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::protocol::keys::{escape, modifier_count};
use crate::types::{KeyIndex, LedColor, Profile};

/// Frame magic prefix.
pub const FRAME_MAGIC: &[u8; 3] = b"ebf";

/// Maximum value the single-digit length field can carry.
pub const MAX_LENGTH_CODE: usize = 9;

/// Offset of the length digit within a frame.
const LENGTH_OFFSET: usize = 3;

/// Message kinds and their wire type digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    /// Bind a macro to a key.
    MacroBind = 0,
    /// Set backlight color and brightness.
    LedColor = 1,
    /// Assign alias text to a key.
    AliasAdd = 2,
    /// Clear the alias on a key.
    AliasRemove = 3,
    /// Store Wi-Fi credentials.
    WifiConfig = 4,
    /// Request the firmware version banner.
    VersionQuery = 5,
    /// Attach script text to a key.
    ScriptAdd = 6,
    /// Clear the script on a key.
    ScriptRemove = 7,
}

impl MessageKind {
    /// Returns the ASCII type digit.
    #[must_use]
    pub const fn type_digit(self) -> u8 {
        b'0' + self as u8
    }
}

/// One logical configuration action, ready to encode.
///
/// Content constraints (macro length, profile and key ranges, color shape)
/// are enforced before construction; encoding itself only fails when the
/// assembled frame outgrows the single-digit length field.
#[derive(Debug, Clone)]
pub enum ConfigMessage {
    /// Bind macro text to a key. The text is token-escaped on encode.
    MacroBind {
        profile: Profile,
        key: KeyIndex,
        text: String,
    },
    /// Set the backlight color and brightness.
    LedColor { color: LedColor, brightness: u8 },
    /// Assign alias text to a key. Not token-escaped.
    AliasAdd {
        profile: Profile,
        key: KeyIndex,
        alias: String,
    },
    /// Clear the alias on a key.
    AliasRemove { profile: Profile, key: KeyIndex },
    /// Store Wi-Fi credentials on the device.
    WifiConfig { ssid: String, password: String },
    /// Request the firmware version banner.
    VersionQuery,
    /// Attach script text to a key. Not token-escaped.
    ScriptAdd {
        profile: Profile,
        key: KeyIndex,
        script: String,
    },
    /// Clear the script on a key.
    ScriptRemove { profile: Profile, key: KeyIndex },
}

impl ConfigMessage {
    /// Returns the message kind.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::MacroBind { .. } => MessageKind::MacroBind,
            Self::LedColor { .. } => MessageKind::LedColor,
            Self::AliasAdd { .. } => MessageKind::AliasAdd,
            Self::AliasRemove { .. } => MessageKind::AliasRemove,
            Self::WifiConfig { .. } => MessageKind::WifiConfig,
            Self::VersionQuery => MessageKind::VersionQuery,
            Self::ScriptAdd { .. } => MessageKind::ScriptAdd,
            Self::ScriptRemove { .. } => MessageKind::ScriptRemove,
        }
    }

    /// Encodes the message into one complete wire frame.
    ///
    /// Single pass: magic, placeholder length, type digit, body, then one
    /// patch of the length digit.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Overflow`] if the length code exceeds one digit.
    pub fn encode(&self) -> Result<Bytes, FrameError> {
        let mut buf = BytesMut::with_capacity(16);
        buf.put_slice(FRAME_MAGIC);
        buf.put_u8(b'0'); // placeholder, patched below
        buf.put_u8(self.kind().type_digit());
        self.put_body(&mut buf);

        let length = buf.len() - LENGTH_OFFSET - 1;
        if length > MAX_LENGTH_CODE {
            return Err(FrameError::Overflow {
                len: length,
                max: MAX_LENGTH_CODE,
            });
        }
        buf[LENGTH_OFFSET] = b'0' + length as u8;

        Ok(buf.freeze())
    }

    fn put_body(&self, buf: &mut BytesMut) {
        match self {
            Self::MacroBind { profile, key, text } => {
                put_key_header(buf, *profile, *key);
                let flag = if modifier_count(text) > 0 { b'1' } else { b'0' };
                buf.put_u8(flag);
                put_text(buf, &escape(text));
            }
            Self::LedColor { color, brightness } => {
                buf.put_slice(color.to_hex().as_bytes());
                buf.put_u8(*brightness);
            }
            Self::AliasAdd {
                profile,
                key,
                alias,
            } => {
                put_key_header(buf, *profile, *key);
                put_text(buf, alias);
            }
            Self::AliasRemove { profile, key } | Self::ScriptRemove { profile, key } => {
                put_key_header(buf, *profile, *key);
            }
            Self::WifiConfig { ssid, password } => {
                put_text(buf, ssid);
                buf.put_u8(b'.');
                put_text(buf, password);
            }
            Self::VersionQuery => {}
            Self::ScriptAdd {
                profile,
                key,
                script,
            } => {
                put_key_header(buf, *profile, *key);
                put_text(buf, script);
            }
        }
    }
}

/// Writes `profile '.' key ':'`, the shared per-key body prefix.
fn put_key_header(buf: &mut BytesMut, profile: Profile, key: KeyIndex) {
    buf.put_u8(profile.as_char() as u8);
    buf.put_u8(b'.');
    buf.put_u8(key.as_char() as u8);
    buf.put_u8(b':');
}

/// Writes text one code unit per byte.
///
/// Sentinel characters (U+00A8..=U+00E7) map straight to their byte value;
/// no UTF-8 transcoding happens on the wire. Callers gate input through
/// [`crate::protocol::validate_wire_text`], so every character fits a byte.
fn put_text(buf: &mut BytesMut, text: &str) {
    for ch in text.chars() {
        buf.put_u8(ch as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(slot: u8) -> Profile {
        Profile::new(slot).unwrap()
    }

    fn key(n: u8) -> KeyIndex {
        KeyIndex::new(n).unwrap()
    }

    #[test]
    fn test_version_query_frame() {
        let frame = ConfigMessage::VersionQuery.encode().unwrap();
        assert_eq!(&frame[..], b"ebf15");
    }

    #[test]
    fn test_alias_remove_frame() {
        let msg = ConfigMessage::AliasRemove {
            profile: profile(2),
            key: key(3),
        };
        let frame = msg.encode().unwrap();
        assert_eq!(&frame[..], b"ebf532.3:");
    }

    #[test]
    fn test_script_remove_frame() {
        let msg = ConfigMessage::ScriptRemove {
            profile: profile(2),
            key: key(3),
        };
        let frame = msg.encode().unwrap();
        assert_eq!(&frame[..], b"ebf572.3:");
    }

    #[test]
    fn test_length_digit_is_idempotent() {
        let messages = [
            ConfigMessage::VersionQuery,
            ConfigMessage::AliasRemove {
                profile: profile(0),
                key: key(1),
            },
            ConfigMessage::AliasAdd {
                profile: profile(1),
                key: key(2),
                alias: "cp".into(),
            },
            ConfigMessage::LedColor {
                color: LedColor::new(0xFF, 0x88, 0x00),
                brightness: 0x40,
            },
        ];
        for msg in &messages {
            let frame = msg.encode().unwrap();
            // Re-derive the length code from the finished frame.
            assert_eq!(frame[3], b'0' + (frame.len() - 4) as u8);
        }
    }

    #[test]
    fn test_macro_bind_escapes_and_flags() {
        let msg = ConfigMessage::MacroBind {
            profile: profile(0),
            key: key(1),
            text: "[lctrl]c".into(),
        };
        let frame = msg.encode().unwrap();
        assert_eq!(&frame[..], b"ebf800.1:1\xE0c");
    }

    #[test]
    fn test_macro_bind_without_modifiers() {
        let msg = ConfigMessage::MacroBind {
            profile: profile(0),
            key: key(1),
            text: "hi".into(),
        };
        let frame = msg.encode().unwrap();
        assert_eq!(&frame[..], b"ebf800.1:0hi");
    }

    #[test]
    fn test_led_color_frame() {
        let msg = ConfigMessage::LedColor {
            color: LedColor::new(0xFF, 0x88, 0x00),
            brightness: 0x40,
        };
        let frame = msg.encode().unwrap();
        assert_eq!(&frame[..], b"ebf81ff8800\x40");
    }

    #[test]
    fn test_wifi_config_frame() {
        let msg = ConfigMessage::WifiConfig {
            ssid: "ab".into(),
            password: "cdef".into(),
        };
        let frame = msg.encode().unwrap();
        assert_eq!(&frame[..], b"ebf84ab.cdef");
    }

    #[test]
    fn test_alias_text_is_not_token_escaped() {
        let msg = ConfigMessage::AliasAdd {
            profile: profile(0),
            key: key(1),
            alias: "[up]".into(),
        };
        let frame = msg.encode().unwrap();
        assert_eq!(&frame[..], b"ebf920.1:[up]");
    }

    #[test]
    fn test_length_overflow_is_rejected() {
        let msg = ConfigMessage::AliasAdd {
            profile: profile(0),
            key: key(1),
            alias: "too-long-alias".into(),
        };
        match msg.encode() {
            Err(FrameError::Overflow { len, max }) => {
                assert!(len > max);
                assert_eq!(max, MAX_LENGTH_CODE);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_type_digits() {
        assert_eq!(MessageKind::MacroBind.type_digit(), b'0');
        assert_eq!(MessageKind::LedColor.type_digit(), b'1');
        assert_eq!(MessageKind::AliasAdd.type_digit(), b'2');
        assert_eq!(MessageKind::AliasRemove.type_digit(), b'3');
        assert_eq!(MessageKind::WifiConfig.type_digit(), b'4');
        assert_eq!(MessageKind::VersionQuery.type_digit(), b'5');
        assert_eq!(MessageKind::ScriptAdd.type_digit(), b'6');
        assert_eq!(MessageKind::ScriptRemove.type_digit(), b'7');
    }
}
