//! Protocol definitions for the EZB macro-pad.
//!
//! This module contains the low-level protocol pieces:
//! - Frame encoding (magic, length digit, type digit, body)
//! - The key token substitution table
//! - The streaming banner parser
//! - Pre-send validation of macro text

pub mod frame;
pub mod keys;
pub mod parser;
pub mod validate;

pub use frame::{ConfigMessage, FRAME_MAGIC, MAX_LENGTH_CODE, MessageKind};
pub use keys::{KEY_TOKENS, KeyToken, escape, modifier_count};
pub use parser::{Response, ResponseParser, VERSION_MARKER};
pub use validate::{MAX_KEYS_WITH_MODIFIERS, MAX_PLAIN_LEN, validate_macro, validate_wire_text};
