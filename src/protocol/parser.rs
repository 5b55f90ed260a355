//! Streaming parser for unsolicited device banners.
//!
//! The device mixes free-form status text into the inbound stream. The
//! only structured banner today is the firmware version line: a literal
//! marker followed immediately by a decimal number, with no terminator.
//! The parser is a substring scan over an accumulating buffer, organized
//! as a marker table so further banner kinds extend the table rather than
//! the algorithm.

use crate::types::VersionNumber;

/// Marker announcing the firmware version banner.
pub const VERSION_MARKER: &str = "APP-VER=";

/// A recognized inbound banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Firmware version banner.
    Version(VersionNumber),
}

/// Known banner markers and their payload interpreters.
const MARKERS: &[(&str, fn(&str) -> Option<Response>)] = &[(VERSION_MARKER, parse_version)];

/// Parses the leading decimal digits after the version marker.
///
/// Trailing non-digit text is ignored. Returns `None` when the payload
/// does not begin with a digit; an empty payload may still complete in a
/// later chunk, while a non-digit start never will.
fn parse_version(payload: &str) -> Option<Response> {
    let digits: String = payload.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().map(Response::Version)
}

/// Accumulates inbound text and extracts known banners.
#[derive(Debug, Default)]
pub struct ResponseParser {
    buffer: String,
}

impl ResponseParser {
    /// Creates an empty parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one inbound chunk and returns a banner if one completed.
    ///
    /// Text is retained across calls until a marker with a parseable
    /// payload is seen; the buffer is then cleared. Unmatched growth is
    /// not an error, just unresolved state. A marker whose payload has
    /// already turned unparseable (it starts with text no number can grow
    /// out of) is discarded, so a dead banner never masks later ones.
    pub fn feed(&mut self, chunk: &str) -> Option<Response> {
        self.buffer.push_str(chunk);

        for (marker, parse) in MARKERS {
            while self.buffer.len() > marker.len() {
                let Some(pos) = self.buffer.find(marker) else {
                    break;
                };
                let payload_start = pos + marker.len();
                let payload = &self.buffer[payload_start..];

                if let Some(response) = parse(payload) {
                    tracing::debug!("matched banner {marker:?}: {response:?}");
                    self.buffer.clear();
                    return Some(response);
                }
                if payload.is_empty() {
                    // The payload may still arrive in the next chunk.
                    break;
                }

                // Non-empty payload that did not parse cannot become valid
                // by appending more text; drop the dead banner and rescan.
                tracing::warn!("discarding unparseable banner payload after {marker:?}");
                self.buffer.drain(..payload_start);
            }
        }

        None
    }

    /// Returns the number of code units currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discards any accumulated text.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_split_across_chunks() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("APP-VER="), None);
        assert_eq!(parser.feed("5"), Some(Response::Version(5)));
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_version_after_garbage() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("garbage"), None);
        assert_eq!(parser.feed("APP-VER=12"), Some(Response::Version(12)));
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_trailing_text_is_ignored() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("APP-VER=42 ready"), Some(Response::Version(42)));
    }

    #[test]
    fn test_number_split_across_chunks() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("bootAPP-VER="), None);
        assert_eq!(parser.feed("7"), Some(Response::Version(7)));
    }

    #[test]
    fn test_unmatched_text_is_retained() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("no marker here"), None);
        assert_eq!(parser.buffered(), "no marker here".len());
        parser.clear();
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_malformed_banner_does_not_mask_later_ones() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("APP-VER=vX"), None);
        assert_eq!(parser.feed("APP-VER=7"), Some(Response::Version(7)));
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_malformed_payload_after_pending_marker() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("APP-VER="), None);
        assert_eq!(parser.feed("x"), None);
        assert_eq!(parser.feed("APP-VER=9"), Some(Response::Version(9)));
    }

    #[test]
    fn test_whole_banner_in_one_chunk() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed("APP-VER=103"), Some(Response::Version(103)));
    }
}
