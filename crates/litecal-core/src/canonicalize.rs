//! The event canonicalizer: raw fields in, a trusted event and its
//! calendar payload out.
//!
//! Canonicalization never fails. Each step has a fallback:
//!
//! | Step | Failure | Recovery |
//! |------|---------|----------|
//! | normalize | end not after start | keep the start, use the default end |
//! | normalize | anything else | synthetic one-hour event at the current minute |
//! | upstream payload | undecodable or invalid | regenerate from the event |
//!
//! The outcome of each step is recorded in [`Canonicalized`] so callers can
//! tell a clean result from a recovered one.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::EncodedPayload;
use crate::error::{NormalizationError, PayloadRejected};
use crate::event::{CanonicalEvent, DEFAULT_TITLE, DEFAULT_UID_DOMAIN, EventFieldsRaw};
use crate::ics::{CalendarDocumentEncoder, DEFAULT_PRODUCT_ID, InterchangeDocument};
use crate::normalize::DateTimeNormalizer;

/// Settings shared by normalization and encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalizerOptions {
    /// Title used when none was extracted.
    pub default_title: String,
    /// Event length when no usable end was extracted.
    pub default_duration_minutes: u32,
    /// Domain part of generated uids.
    pub uid_domain: String,
    /// `PRODID` written to documents.
    pub product_id: String,
    /// Alert offset passed to the device calendar.
    pub reminder_minutes: u32,
}

impl Default for CanonicalizerOptions {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            default_duration_minutes: 60,
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            reminder_minutes: 15,
        }
    }
}

/// How the canonical event was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizationOutcome {
    /// The raw fields normalized cleanly.
    Normalized,
    /// The extracted end was unusable; the default duration was applied.
    DefaultEnd(NormalizationError),
    /// The raw fields were unusable; a placeholder event was built.
    Synthetic(NormalizationError),
}

/// Where the surfaced payload came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Encoded from the canonical event; no upstream payload was offered.
    Regenerated,
    /// The upstream payload passed validation. Its document is surfaced
    /// with CRLF line endings and re-encoded to match.
    Upstream,
    /// The upstream payload was rejected and regenerated.
    Replaced(PayloadRejected),
}

/// Result of a canonicalization.
///
/// `payload` always decodes to `document`, and `document` always passes
/// [`validate`](crate::ics::validate).
#[derive(Debug, Clone)]
pub struct Canonicalized {
    pub event: CanonicalEvent,
    pub document: InterchangeDocument,
    pub payload: EncodedPayload,
    pub outcome: NormalizationOutcome,
    pub payload_source: PayloadSource,
}

impl Canonicalized {
    pub fn into_parts(self) -> (CanonicalEvent, InterchangeDocument, EncodedPayload) {
        (self.event, self.document, self.payload)
    }

    /// True if any step had to fall back.
    pub fn used_fallback(&self) -> bool {
        !matches!(self.outcome, NormalizationOutcome::Normalized)
            || matches!(self.payload_source, PayloadSource::Replaced(_))
    }
}

/// Orchestrates normalization, encoding and payload validation.
#[derive(Debug, Clone)]
pub struct EventCanonicalizer {
    options: CanonicalizerOptions,
    normalizer: DateTimeNormalizer,
    encoder: CalendarDocumentEncoder,
}

impl Default for EventCanonicalizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EventCanonicalizer {
    pub fn new(options: CanonicalizerOptions) -> Self {
        Self {
            normalizer: DateTimeNormalizer::new(&options),
            encoder: CalendarDocumentEncoder::new(options.product_id.clone()),
            options,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CanonicalizerOptions::default())
    }

    pub fn options(&self) -> &CanonicalizerOptions {
        &self.options
    }

    pub fn encoder(&self) -> &CalendarDocumentEncoder {
        &self.encoder
    }

    /// Canonicalizes raw fields and encodes a fresh payload.
    pub fn canonicalize(&self, raw: &EventFieldsRaw) -> Canonicalized {
        self.canonicalize_at(raw, None, Local::now())
    }

    /// Canonicalizes raw fields, preferring the upstream payload when it
    /// decodes to a valid document.
    pub fn canonicalize_with_upstream(
        &self,
        raw: &EventFieldsRaw,
        upstream: Option<&str>,
    ) -> Canonicalized {
        self.canonicalize_at(raw, upstream, Local::now())
    }

    /// Canonicalizes at a fixed clock reading.
    pub fn canonicalize_at(
        &self,
        raw: &EventFieldsRaw,
        upstream: Option<&str>,
        now: DateTime<Local>,
    ) -> Canonicalized {
        let (event, outcome) = self.normalize_or_recover(raw, now);

        let (document, payload, payload_source) = match upstream.map(Self::accept_upstream) {
            Some(Ok((payload, document))) => {
                debug!(uid = %event.uid(), "Using upstream payload");
                (document, payload, PayloadSource::Upstream)
            }
            Some(Err(err)) => {
                warn!(error = %err, "Discarding upstream payload, regenerating");
                let document = self.encoder.encode(&event);
                let payload = document.encode();
                (document, payload, PayloadSource::Replaced(err))
            }
            None => {
                let document = self.encoder.encode(&event);
                let payload = document.encode();
                (document, payload, PayloadSource::Regenerated)
            }
        };

        debug!(
            uid = %event.uid(),
            lines = document.lines().len(),
            payload_len = payload.as_str().len(),
            "Canonicalized event"
        );

        Canonicalized {
            event,
            document,
            payload,
            outcome,
            payload_source,
        }
    }

    /// Checks an externally supplied payload.
    ///
    /// Strips a data-URL prefix, decodes, and validates the document. The
    /// returned payload is the document re-encoded, so it decodes to exactly
    /// `document.text()` whatever line endings the upstream used.
    pub fn accept_upstream(
        payload: &str,
    ) -> Result<(EncodedPayload, InterchangeDocument), PayloadRejected> {
        let document = EncodedPayload::parse(payload)?.decode_document()?;
        Ok((document.encode(), document))
    }

    fn normalize_or_recover(
        &self,
        raw: &EventFieldsRaw,
        now: DateTime<Local>,
    ) -> (CanonicalEvent, NormalizationOutcome) {
        let err = match self.normalizer.normalize_at(raw, now) {
            Ok(event) => return (event, NormalizationOutcome::Normalized),
            Err(err) => err,
        };

        if let NormalizationError::NonMonotonicRange { .. } = err {
            warn!(error = %err, "Applying default duration");
            match self.normalizer.normalize_with_default_end_at(raw, now) {
                Ok(event) => return (event, NormalizationOutcome::DefaultEnd(err)),
                Err(retry) => {
                    warn!(error = %retry, "Default duration also rejected");
                }
            }
        }

        warn!(error = %err, "Using placeholder event");
        (
            self.normalizer.synthetic_at(now),
            NormalizationOutcome::Synthetic(err),
        )
    }
}

/// Canonicalizes with default options.
pub fn canonicalize(raw: &EventFieldsRaw) -> Canonicalized {
    EventCanonicalizer::with_defaults().canonicalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::error::CodecError;
    use crate::ics::{parse_event, validate};
    use crate::time::LocalInstant;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> LocalInstant {
        LocalInstant::new(y, m, d, h, min).unwrap()
    }

    fn dentist() -> EventFieldsRaw {
        EventFieldsRaw::new("2024-03-10", "14:00")
            .with_title("Dentist")
            .with_location("Suite 4, Main St")
            .with_description("Bring card,\nask about x-rays")
    }

    fn run(raw: &EventFieldsRaw, upstream: Option<&str>) -> Canonicalized {
        EventCanonicalizer::with_defaults().canonicalize_at(raw, upstream, now())
    }

    mod options {
        use super::*;

        #[test]
        fn defaults() {
            let options = CanonicalizerOptions::default();
            assert_eq!(options.default_title, "Calendar Event");
            assert_eq!(options.default_duration_minutes, 60);
            assert_eq!(options.uid_domain, "litecal.app");
            assert_eq!(options.product_id, "-//LiteCal//Event Canonicalizer//EN");
            assert_eq!(options.reminder_minutes, 15);
        }

        #[test]
        fn partial_deserialization_keeps_defaults() {
            let options: CanonicalizerOptions =
                serde_json::from_str(r#"{"default_duration_minutes": 45}"#).unwrap();
            assert_eq!(options.default_duration_minutes, 45);
            assert_eq!(options.uid_domain, "litecal.app");
        }

        #[test]
        fn options_flow_into_event_and_document() {
            let options = CanonicalizerOptions {
                default_duration_minutes: 30,
                uid_domain: "example.org".to_string(),
                product_id: "-//Example//Test//EN".to_string(),
                ..CanonicalizerOptions::default()
            };
            let result = EventCanonicalizer::new(options).canonicalize_at(
                &EventFieldsRaw::new("2024-03-10", "14:00"),
                None,
                now(),
            );
            assert_eq!(result.event.end(), instant(2024, 3, 10, 14, 30));
            assert!(result.event.uid().ends_with("@example.org"));
            assert_eq!(result.document.lines()[2], "PRODID:-//Example//Test//EN");
        }
    }

    mod normalization {
        use super::*;

        #[test]
        fn clean_fields() {
            let result = run(&dentist(), None);
            assert_eq!(result.outcome, NormalizationOutcome::Normalized);
            assert_eq!(result.payload_source, PayloadSource::Regenerated);
            assert!(!result.used_fallback());
            assert_eq!(result.event.start(), instant(2024, 3, 10, 14, 0));
            assert_eq!(result.event.end(), instant(2024, 3, 10, 15, 0));
        }

        #[test]
        fn non_monotonic_end_gets_default_duration() {
            let raw = dentist().with_end_time("09:00");
            let result = run(&raw, None);
            assert!(matches!(
                result.outcome,
                NormalizationOutcome::DefaultEnd(NormalizationError::NonMonotonicRange { .. })
            ));
            assert!(result.used_fallback());
            assert_eq!(result.event.title(), "Dentist");
            assert_eq!(result.event.start(), instant(2024, 3, 10, 14, 0));
            assert_eq!(result.event.end(), instant(2024, 3, 10, 15, 0));
        }

        #[test]
        fn missing_start_gets_synthetic_event() {
            let raw = EventFieldsRaw::default().with_title("Dentist");
            let result = run(&raw, None);
            assert_eq!(
                result.outcome,
                NormalizationOutcome::Synthetic(NormalizationError::MissingRequiredField {
                    field: "startDate"
                })
            );
            assert_eq!(result.event.title(), "Calendar Event");
            assert_eq!(result.event.start(), instant(2024, 3, 1, 9, 30));
            assert_eq!(result.event.end(), instant(2024, 3, 1, 10, 30));
            assert_eq!(result.event.location(), None);
        }

        #[test]
        fn malformed_start_gets_synthetic_event() {
            let raw = EventFieldsRaw::new("next tuesday", "14:00");
            let result = run(&raw, None);
            assert!(matches!(
                result.outcome,
                NormalizationOutcome::Synthetic(NormalizationError::InvalidFormat { .. })
            ));
            assert!(validate(&result.document).is_ok());
        }
    }

    mod payloads {
        use super::*;

        #[test]
        fn regenerated_payload_roundtrips() {
            let result = run(&dentist(), None);
            assert_eq!(result.payload.decode().unwrap(), result.document.text());
            assert!(validate(&result.document).is_ok());
        }

        #[test]
        fn description_survives_the_document() {
            let result = run(&dentist(), None);
            let parsed = parse_event(&result.document).unwrap();
            assert_eq!(
                parsed.description.as_deref(),
                Some("Bring card,\nask about x-rays")
            );
            assert_eq!(parsed.location.as_deref(), Some("Suite 4, Main St"));
        }

        #[test]
        fn valid_upstream_payload_is_kept() {
            let upstream = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:From upstream\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
            let encoded = codec::encode(upstream);
            let result = run(&dentist(), Some(&encoded));
            assert_eq!(result.payload_source, PayloadSource::Upstream);
            assert_eq!(result.payload.as_str(), encoded);
            assert_eq!(result.document.text(), upstream);
            assert_eq!(result.event.title(), "Dentist");
        }

        #[test]
        fn data_url_upstream_payload_is_kept() {
            let upstream = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
            let url = format!("data:text/calendar;base64,{}", codec::encode(upstream));
            let result = run(&dentist(), Some(&url));
            assert_eq!(result.payload_source, PayloadSource::Upstream);
            assert_eq!(result.payload.as_str(), codec::encode(upstream));
        }

        #[test]
        fn lf_upstream_payload_matches_document() {
            let upstream = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nEND:VEVENT\nEND:VCALENDAR\n";
            let result = run(&dentist(), Some(&codec::encode(upstream)));
            assert_eq!(result.payload_source, PayloadSource::Upstream);
            assert_eq!(result.payload.decode().unwrap(), result.document.text());
            assert_eq!(
                result.document.text(),
                "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
            );
            assert_eq!(result.payload.decode_document().unwrap(), result.document);
        }

        #[test]
        fn start_on_last_representable_minute_gets_synthetic_event() {
            let result = run(&EventFieldsRaw::new("9999-12-31", "23:59"), None);
            assert!(matches!(
                result.outcome,
                NormalizationOutcome::Synthetic(NormalizationError::InvalidFormat { .. })
            ));
            let parsed = parse_event(&result.document).unwrap();
            assert_eq!(parsed.start, Some(result.event.start()));
            assert_eq!(parsed.end, Some(result.event.end()));
        }

        #[test]
        fn truncated_upstream_is_replaced() {
            let good = run(&dentist(), None).payload.into_string();
            let truncated = &good[..good.len() - 1];

            let result = run(&dentist(), Some(truncated));
            assert!(matches!(
                result.payload_source,
                PayloadSource::Replaced(PayloadRejected::Codec(CodecError::TruncatedInput { .. }))
            ));
            assert!(result.used_fallback());
            assert_eq!(result.outcome, NormalizationOutcome::Normalized);
            assert_eq!(result.event.title(), "Dentist");
            assert_eq!(result.event.start(), instant(2024, 3, 10, 14, 0));

            let document = result.payload.decode_document().unwrap();
            assert_eq!(document, result.document);
            assert!(document.lines().contains(&"DTSTART:20240310T140000Z".to_string()));
        }

        #[test]
        fn non_calendar_upstream_is_replaced() {
            let result = run(&dentist(), Some(&codec::encode("just some text")));
            assert_eq!(
                result.payload_source,
                PayloadSource::Replaced(PayloadRejected::Document(
                    crate::error::DocumentInvalid::MissingCalendarBegin
                ))
            );
            assert!(validate(&result.document).is_ok());
        }

        #[test]
        fn into_parts() {
            let result = run(&dentist(), None);
            let expected_uid = result.event.uid().to_string();
            let (event, document, payload) = result.into_parts();
            assert_eq!(event.uid(), expected_uid);
            assert_eq!(payload.decode().unwrap(), document.text());
        }
    }
}
