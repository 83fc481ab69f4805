//! Transport-safe text encoding.
//!
//! Calendar documents travel between collaborators as standard base64
//! (`A-Z a-z 0-9 + /`, `=` padding). Encoding never fails; decoding is strict
//! and reports exactly what is wrong.
//!
//! ```text
//!   bytes:  |    b0    |    b1    |    b2    |
//!   bits:   |aaaaaa bb|bbbb cccc|cc dddddd|
//!   chars:     a       b        c       d
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, PayloadRejected};
use crate::ics::{InterchangeDocument, validate};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: char = '=';

/// Encodes UTF-8 text as base64.
pub fn encode(text: &str) -> String {
    encode_bytes(text.as_bytes())
}

/// Encodes arbitrary bytes as base64.
pub fn encode_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);

    for chunk in bytes.chunks(3) {
        let b0 = u32::from(chunk[0]);
        let b1 = chunk.get(1).copied().map_or(0, u32::from);
        let b2 = chunk.get(2).copied().map_or(0, u32::from);
        let group = (b0 << 16) | (b1 << 8) | b2;

        out.push(sextet_char(group >> 18));
        out.push(sextet_char(group >> 12));
        out.push(if chunk.len() > 1 {
            sextet_char(group >> 6)
        } else {
            PAD
        });
        out.push(if chunk.len() > 2 {
            sextet_char(group)
        } else {
            PAD
        });
    }

    out
}

fn sextet_char(bits: u32) -> char {
    char::from(ALPHABET[(bits & 0x3f) as usize])
}

fn sextet_value(c: char) -> Option<u32> {
    let value = match c {
        'A'..='Z' => c as u32 - 'A' as u32,
        'a'..='z' => c as u32 - 'a' as u32 + 26,
        '0'..='9' => c as u32 - '0' as u32 + 52,
        '+' => 62,
        '/' => 63,
        _ => return None,
    };
    Some(value)
}

/// Decodes base64 into bytes.
///
/// # Errors
///
/// [`CodecError::InvalidAlphabet`] for a character outside the alphabet or
/// padding anywhere but the last one or two positions;
/// [`CodecError::TruncatedInput`] when the length is not a multiple of four.
pub fn decode_bytes(input: &str) -> Result<Vec<u8>, CodecError> {
    if let Some((position, character)) = input
        .chars()
        .enumerate()
        .find(|(_, c)| *c != PAD && sextet_value(*c).is_none())
    {
        return Err(CodecError::InvalidAlphabet {
            character,
            position,
        });
    }

    // Only ASCII remains, so byte and character positions agree.
    let length = input.len();
    if length % 4 != 0 {
        return Err(CodecError::TruncatedInput { length });
    }

    let padding = input.chars().rev().take_while(|c| *c == PAD).count();
    if padding > 2 {
        return Err(CodecError::InvalidAlphabet {
            character: PAD,
            position: length - padding,
        });
    }
    if let Some(position) = input[..length - padding].find(PAD) {
        return Err(CodecError::InvalidAlphabet {
            character: PAD,
            position,
        });
    }

    let mut out = Vec::with_capacity(length / 4 * 3);
    for group in input.as_bytes().chunks(4) {
        let mut bits = 0u32;
        let mut filled = 0;
        for &byte in group {
            let c = char::from(byte);
            if c == PAD {
                bits <<= 6;
            } else {
                bits = (bits << 6) | sextet_value(c).unwrap_or(0);
                filled += 1;
            }
        }

        out.push((bits >> 16) as u8);
        if filled > 2 {
            out.push((bits >> 8) as u8);
        }
        if filled > 3 {
            out.push(bits as u8);
        }
    }

    Ok(out)
}

/// Decodes base64 into UTF-8 text.
///
/// # Errors
///
/// Everything [`decode_bytes`] reports, plus [`CodecError::InvalidUtf8`].
pub fn decode(input: &str) -> Result<String, CodecError> {
    let bytes = decode_bytes(input)?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
}

/// Strips a `data:<mime>;base64,` prefix, if present.
///
/// Upstream collaborators send either bare base64 or a data URL.
pub fn strip_data_url(input: &str) -> &str {
    input
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .map_or(input, |(_, payload)| payload)
}

/// A calendar document in its transport-safe, base64 form.
///
/// Deserializing goes through [`EncodedPayload::parse`], so a payload read
/// from JSON has already been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedPayload(String);

impl EncodedPayload {
    /// Encodes document text.
    pub fn encode(text: &str) -> Self {
        Self(encode(text))
    }

    /// Wraps an already-encoded payload, checking that it decodes to a valid
    /// calendar document.
    pub fn parse(payload: &str) -> Result<Self, PayloadRejected> {
        let payload = strip_data_url(payload.trim());
        let document = InterchangeDocument::from_text(&decode(payload)?);
        validate(&document)?;
        Ok(Self(payload.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decodes back to the document text.
    pub fn decode(&self) -> Result<String, CodecError> {
        decode(&self.0)
    }

    /// Decodes and validates the document.
    pub fn decode_document(&self) -> Result<InterchangeDocument, PayloadRejected> {
        let document = InterchangeDocument::from_text(&self.decode()?);
        validate(&document)?;
        Ok(document)
    }
}

impl TryFrom<String> for EncodedPayload {
    type Error = PayloadRejected;

    fn try_from(payload: String) -> Result<Self, Self::Error> {
        Self::parse(&payload)
    }
}

impl From<EncodedPayload> for String {
    fn from(payload: EncodedPayload) -> Self {
        payload.0
    }
}

impl fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
