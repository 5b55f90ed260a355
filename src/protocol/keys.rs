//! Key token table for macro text substitution.
//!
//! Raw macro text names non-printable keys with bracketed tokens such as
//! `[lctrl]` or `[f5]`. Before transmission each known token is replaced
//! by a single sentinel code unit in the `0xA8..=0xE7` range: special keys
//! carry their HID usage id plus `0x80`, modifiers sit on the HID modifier
//! block at `0xE0..=0xE7`. Unknown bracketed text passes through unescaped.

/// A bracketed key token and its wire sentinel.
#[derive(Debug, Clone, Copy)]
pub struct KeyToken {
    /// Token name as written in raw macro text.
    pub name: &'static str,
    /// Sentinel code unit substituted on the wire.
    pub code: u8,
    /// True for the 8 modifier keys, which the validator counts separately.
    pub modifier: bool,
}

const fn modifier(name: &'static str, code: u8) -> KeyToken {
    KeyToken {
        name,
        code,
        modifier: true,
    }
}

const fn key(name: &'static str, code: u8) -> KeyToken {
    KeyToken {
        name,
        code,
        modifier: false,
    }
}

/// The complete token table. This is a closed set; the device firmware
/// understands exactly these sentinels.
pub const KEY_TOKENS: &[KeyToken] = &[
    // Modifiers (HID modifier bits)
    modifier("[lctrl]", 0xE0),
    modifier("[lshift]", 0xE1),
    modifier("[lalt]", 0xE2),
    modifier("[lgui]", 0xE3),
    modifier("[rctrl]", 0xE4),
    modifier("[rshift]", 0xE5),
    modifier("[ralt]", 0xE6),
    modifier("[rgui]", 0xE7),
    // Editing keys (HID usage id + 0x80)
    key("[enter]", 0xA8),
    key("[esc]", 0xA9),
    key("[backspace]", 0xAA),
    key("[tab]", 0xAB),
    key("[space]", 0xAC),
    // Function keys
    key("[f1]", 0xAD),
    key("[f2]", 0xAE),
    key("[f3]", 0xAF),
    key("[f4]", 0xB0),
    key("[f5]", 0xB1),
    key("[f6]", 0xB2),
    key("[f7]", 0xB3),
    key("[f8]", 0xB4),
    key("[f9]", 0xB5),
    key("[f10]", 0xB6),
    key("[f11]", 0xB7),
    key("[f12]", 0xB8),
    // Navigation keys
    key("[printscreen]", 0xB9),
    key("[scrolllock]", 0xBA),
    key("[pause]", 0xBB),
    key("[insert]", 0xBC),
    key("[home]", 0xBD),
    key("[pageup]", 0xBE),
    key("[delete]", 0xBF),
    key("[end]", 0xC0),
    key("[pagedown]", 0xC1),
    // Arrow keys
    key("[right]", 0xC2),
    key("[left]", 0xC3),
    key("[down]", 0xC4),
    key("[up]", 0xC5),
];

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

// Token names and sentinel codes must be pairwise distinct.
const _: () = {
    let mut i = 0;
    while i < KEY_TOKENS.len() {
        assert!(
            KEY_TOKENS[i].code >= 0xA8 && KEY_TOKENS[i].code <= 0xE7,
            "sentinel code outside 0xA8..=0xE7"
        );
        let mut j = i + 1;
        while j < KEY_TOKENS.len() {
            assert!(
                KEY_TOKENS[i].code != KEY_TOKENS[j].code,
                "duplicate sentinel code"
            );
            assert!(
                !str_eq(KEY_TOKENS[i].name, KEY_TOKENS[j].name),
                "duplicate token name"
            );
            j += 1;
        }
        i += 1;
    }
};

/// Replaces every occurrence of every known token with its sentinel.
///
/// Replacement is sequential over the table. Token patterns are ASCII and
/// every expansion is a single non-ASCII code unit, so no expansion can
/// form a later token's pattern; the result is order-independent.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = text.to_owned();
    for token in KEY_TOKENS {
        if out.contains(token.name) {
            let sentinel = char::from(token.code).to_string();
            out = out.replace(token.name, &sentinel);
        }
    }
    out
}

/// Counts modifier-token occurrences in raw (pre-substitution) text.
#[must_use]
pub fn modifier_count(text: &str) -> usize {
    KEY_TOKENS
        .iter()
        .filter(|token| token.modifier)
        .map(|token| text.matches(token.name).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        assert_eq!(KEY_TOKENS.len(), 38);
        assert_eq!(KEY_TOKENS.iter().filter(|t| t.modifier).count(), 8);
    }

    #[test]
    fn test_sentinel_values() {
        let code = |name: &str| {
            KEY_TOKENS
                .iter()
                .find(|t| t.name == name)
                .map(|t| t.code)
                .unwrap()
        };
        assert_eq!(code("[lctrl]"), 0xE0);
        assert_eq!(code("[rgui]"), 0xE7);
        assert_eq!(code("[enter]"), 0xA8);
        assert_eq!(code("[f12]"), 0xB8);
        assert_eq!(code("[up]"), 0xC5);
    }

    #[test]
    fn test_escape_substitutes_tokens() {
        let escaped = escape("[lctrl]c");
        let mut chars = escaped.chars();
        assert_eq!(chars.next(), Some('\u{E0}'));
        assert_eq!(chars.next(), Some('c'));
        assert_eq!(chars.next(), None);
    }

    #[test]
    fn test_escape_is_order_independent() {
        // All tokens concatenated, no overlapping literal occurrences:
        // substituting in table order must equal substituting one at a time
        // in reverse order.
        let text: String = KEY_TOKENS.iter().map(|t| t.name).collect();
        let forward = escape(&text);

        let mut reverse = text.clone();
        for token in KEY_TOKENS.iter().rev() {
            let sentinel = char::from(token.code).to_string();
            reverse = reverse.replace(token.name, &sentinel);
        }

        assert_eq!(forward, reverse);
        assert_eq!(forward.chars().count(), KEY_TOKENS.len());
    }

    #[test]
    fn test_unknown_token_passes_through() {
        assert_eq!(escape("[bogus]x"), "[bogus]x");
    }

    #[test]
    fn test_modifier_count() {
        assert_eq!(modifier_count("abc"), 0);
        assert_eq!(modifier_count("[lctrl]c"), 1);
        assert_eq!(modifier_count("[lctrl][lshift][ralt]x"), 3);
        // Special keys are not modifiers.
        assert_eq!(modifier_count("[enter][f1]"), 0);
    }
}
