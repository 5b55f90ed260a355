//! Pre-encoding validation of raw macro text.
//!
//! The device stores each binding in a fixed-size key report. With
//! modifiers active only 6 simultaneous non-modifier keys fit a single
//! boot-keyboard report; without modifiers the macro buffer holds 128
//! code units. Text that violates either limit is rejected here, before
//! any frame is built.

use crate::error::{Error, Result};
use crate::protocol::keys::{escape, modifier_count};

/// Maximum escaped length for macros without modifier tokens.
pub const MAX_PLAIN_LEN: usize = 128;

/// Maximum non-modifier keys alongside modifiers in one report.
pub const MAX_KEYS_WITH_MODIFIERS: usize = 6;

/// Checks that text is representable on the wire.
///
/// Frame bodies carry one byte per character, so only characters up to
/// U+00FF survive encoding. Anything above that would be silently
/// truncated to its low byte, so it is rejected here with the offending
/// field named.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the text contains a character above
/// U+00FF.
pub fn validate_wire_text(field: &str, text: &str) -> Result<()> {
    if let Some(ch) = text.chars().find(|&ch| ch > '\u{ff}') {
        return Err(Error::Validation {
            reason: format!("{field} contains {ch:?}, which does not fit a single wire byte"),
        });
    }
    Ok(())
}

/// Checks that raw macro text fits the device's key-report limits.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a human-readable reason if the text
/// cannot be represented on the device.
pub fn validate_macro(text: &str) -> Result<()> {
    validate_wire_text("macro", text)?;
    let modifiers = modifier_count(text);
    let escaped_len = escape(text).chars().count();

    if modifiers > 0 {
        let keys = escaped_len - modifiers;
        if keys > MAX_KEYS_WITH_MODIFIERS {
            return Err(Error::Validation {
                reason: format!(
                    "macro presses {keys} keys alongside {modifiers} modifier(s); \
                     at most {MAX_KEYS_WITH_MODIFIERS} fit one report"
                ),
            });
        }
    } else if escaped_len > MAX_PLAIN_LEN {
        return Err(Error::Validation {
            reason: format!("macro is {escaped_len} code units long; maximum is {MAX_PLAIN_LEN}"),
        });
    }

    Ok(())
}
