//! Recovery of the human-readable purchase comment carried in a transfer payload.
//!
//! The comment is cosmetic: decoding is best-effort and never fails the purchase.
//! A payload that cannot be decoded is handed back verbatim as a
//! [`DecodedComment::Fallback`].

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

const DEFAULT_MARKER: &str = "Telegram Stars";

// Marketplace payloads are not always canonically padded or trimmed.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Outcome of decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedComment {
    /// Decoded, and the `<quantity> Telegram Stars...` tail was found.
    Matched(String),
    /// Decoded, but no quantity anchor; the whole sanitized text.
    Unmatched(String),
    /// Decoding failed; the raw input is returned untouched.
    Fallback { raw: String, reason: String },
}

impl DecodedComment {
    pub fn text(&self) -> &str {
        match self {
            DecodedComment::Matched(text) | DecodedComment::Unmatched(text) => text,
            DecodedComment::Fallback { raw, .. } => raw,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            DecodedComment::Matched(text) | DecodedComment::Unmatched(text) => text,
            DecodedComment::Fallback { raw, .. } => raw,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, DecodedComment::Fallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct PayloadDecoder {
    marker: String,
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl PayloadDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different phrase after the quantity token as the extraction anchor.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn decode(&self, payload_base64: &str, expected_quantity: u32) -> DecodedComment {
        let bytes = match LENIENT.decode(repair_padding(payload_base64)) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "payload decode failed, using raw payload as comment");
                return DecodedComment::Fallback {
                    raw: payload_base64.to_string(),
                    reason: e.to_string(),
                };
            }
        };

        let text = collapse_whitespace(&sanitize(&bytes));
        let anchor = format!("{} {}", expected_quantity, regex::escape(&self.marker));
        match Regex::new(&format!("{}.*", anchor)) {
            Ok(pattern) => match pattern.find(&text) {
                Some(found) => {
                    debug!(comment = found.as_str(), "payload comment extracted");
                    DecodedComment::Matched(found.as_str().to_string())
                }
                None => DecodedComment::Unmatched(text),
            },
            Err(e) => {
                warn!(error = %e, "invalid comment anchor");
                DecodedComment::Unmatched(text)
            }
        }
    }
}

/// Appends `=` until the length is a multiple of four.
pub fn repair_padding(input: &str) -> String {
    let mut repaired = input.to_string();
    let remainder = input.len() % 4;
    if remainder != 0 {
        repaired.extend(std::iter::repeat_n('=', 4 - remainder));
    }
    repaired
}

/// Maps every byte outside printable ASCII to a space, one char per byte.
pub fn sanitize(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if (32..=126).contains(&b) { b as char } else { ' ' })
        .collect()
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}
