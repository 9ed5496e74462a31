// src/decode.rs

use encoding_rs::{UTF_8, WINDOWS_1252};
use serde_json::Value;
use std::borrow::Cow;
use tracing::{debug, info};

use crate::error::IngestError;

/// Bytes that have no mapping in cp1252. encoding_rs follows WHATWG and maps
/// them to C1 controls, so they are rejected by hand.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Text encodings an uploaded Iv3 file may be written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Cp1252,
}

/// Tried in order; the first encoding that yields text wins.
pub const CANDIDATE_ENCODINGS: &[TextEncoding] = &[TextEncoding::Utf8, TextEncoding::Cp1252];

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Cp1252 => "cp1252",
        }
    }

    /// Strict decode: `None` on any byte sequence the encoding cannot represent.
    fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Utf8 => UTF_8.decode_without_bom_handling_and_without_replacement(bytes),
            TextEncoding::Cp1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

/// What happened when walking the candidate encodings.
#[derive(Debug)]
pub enum DecodeOutcome {
    Parsed {
        value: Value,
        encoding: TextEncoding,
    },
    /// Text decoding succeeded under `encoding` but JSON parsing did not.
    NotJson {
        encoding: TextEncoding,
        reason: String,
    },
    Undecodable,
}

/// Walk `CANDIDATE_ENCODINGS`, stopping at the first one that produces text.
pub fn try_encodings(bytes: &[u8]) -> DecodeOutcome {
    for &encoding in CANDIDATE_ENCODINGS {
        let text = match encoding.decode(bytes) {
            Some(t) => t,
            None => {
                debug!(encoding = encoding.as_str(), "not decodable, trying next");
                continue;
            }
        };
        let text = text.strip_prefix('\u{feff}').unwrap_or(&*text);
        return match serde_json::from_str::<Value>(text) {
            Ok(value) => DecodeOutcome::Parsed { value, encoding },
            Err(e) => DecodeOutcome::NotJson {
                encoding,
                reason: e.to_string(),
            },
        };
    }
    DecodeOutcome::Undecodable
}

/// Result of [`decode`]: a JSON value, or the errors explaining why there is none.
#[derive(Debug, Default)]
pub struct Decoded {
    pub value: Option<Value>,
    pub encoding: Option<TextEncoding>,
    pub errors: Vec<IngestError>,
}

/// Decode the raw bytes of `name` into JSON, preserving object key order.
pub fn decode(name: &str, bytes: &[u8]) -> Decoded {
    match try_encodings(bytes) {
        DecodeOutcome::Parsed { value, encoding } => {
            info!(file = name, encoding = encoding.as_str(), "verwerken als {}", encoding.as_str());
            Decoded {
                value: Some(value),
                encoding: Some(encoding),
                errors: Vec::new(),
            }
        }
        DecodeOutcome::NotJson { encoding, reason } => {
            debug!(file = name, encoding = encoding.as_str(), %reason, "not JSON");
            Decoded {
                value: None,
                encoding: Some(encoding),
                errors: vec![IngestError::NotJson {
                    name: name.to_string(),
                }],
            }
        }
        DecodeOutcome::Undecodable => Decoded {
            value: None,
            encoding: None,
            errors: vec![IngestError::Unreadable],
        },
    }
}
