//! Error types for canonicalization, payload decoding and document validation.
//!
//! None of these reach the user interface: the
//! [`EventCanonicalizer`](crate::canonicalize::EventCanonicalizer) recovers
//! from every one of them locally, either by applying a default or by
//! regenerating the document from canonical data.

use thiserror::Error;

use crate::time::LocalInstant;

/// Errors raised while turning raw event fields into a canonical event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// A field without which no event can be built is absent or blank.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    /// A field is present but is not a well-formed, in-range value.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidFormat {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The resolved end does not come strictly after the start.
    #[error("event ends at {end}, which is not after its start at {start}")]
    NonMonotonicRange {
        start: LocalInstant,
        end: LocalInstant,
    },
}

impl NormalizationError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: &'static str) -> Self {
        Self::InvalidFormat {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

/// Errors raised while decoding a transport payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A character outside the base64 alphabet, or misplaced padding.
    #[error("invalid base64 character {character:?} at position {position}")]
    InvalidAlphabet { character: char, position: usize },

    /// The input length is not a multiple of four.
    #[error("truncated base64 input: length {length} is not a multiple of 4")]
    TruncatedInput { length: usize },

    /// The decoded bytes are not UTF-8 text.
    #[error("decoded payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Structural defects that make a calendar document unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocumentInvalid {
    /// The document has no content at all.
    #[error("document is empty")]
    Empty,

    /// No `BEGIN:VCALENDAR` line.
    #[error("missing BEGIN:VCALENDAR marker")]
    MissingCalendarBegin,

    /// No `END:VCALENDAR` line after the opening marker.
    #[error("missing END:VCALENDAR marker")]
    MissingCalendarEnd,

    /// No complete `BEGIN:VEVENT` .. `END:VEVENT` block inside the calendar.
    #[error("calendar contains no complete VEVENT block")]
    NoCompleteEvent,
}

/// Why an externally supplied payload was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadRejected {
    /// The payload could not be decoded.
    #[error("payload could not be decoded: {0}")]
    Codec(#[from] CodecError),

    /// The payload decoded to a structurally invalid document.
    #[error("payload is not a valid calendar document: {0}")]
    Document(#[from] DocumentInvalid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_error_display() {
        let err = NormalizationError::MissingRequiredField { field: "startDate" };
        assert_eq!(err.to_string(), "missing required field: startDate");

        let err = NormalizationError::invalid("startTime", "25:00", "hour out of range");
        assert_eq!(
            err.to_string(),
            "invalid startTime \"25:00\": hour out of range"
        );
    }

    #[test]
    fn non_monotonic_display_uses_local_instants() {
        let err = NormalizationError::NonMonotonicRange {
            start: LocalInstant::new(2024, 3, 10, 14, 0).unwrap(),
            end: LocalInstant::new(2024, 3, 10, 9, 0).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "event ends at 2024-03-10T09:00, which is not after its start at 2024-03-10T14:00"
        );
    }

    #[test]
    fn payload_rejected_wraps_sources() {
        let err: PayloadRejected = CodecError::TruncatedInput { length: 5 }.into();
        assert!(err.to_string().contains("not a multiple of 4"));

        let err: PayloadRejected = DocumentInvalid::MissingCalendarEnd.into();
        assert!(err.to_string().contains("END:VCALENDAR"));
    }
}
