//! [`CanonicalEvent`] to [`InterchangeDocument`].

use crate::event::{CanonicalEvent, is_sentinel};
use crate::ics::InterchangeDocument;
use crate::time::utc_ics_stamp;

/// Product identifier written to `PRODID`.
pub const DEFAULT_PRODUCT_ID: &str = "-//LiteCal//Event Canonicalizer//EN";

/// Escapes a text value for a content line.
///
/// Backslash, semicolon and comma are backslash-escaped and every line break
/// (CRLF, CR or LF) becomes the two characters `\n`. Other control
/// characters except tab are dropped.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push('\t'),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

/// Builds the single-event documents handed to calendar applications.
#[derive(Debug, Clone)]
pub struct CalendarDocumentEncoder {
    product_id: String,
}

impl Default for CalendarDocumentEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_ID)
    }
}

impl CalendarDocumentEncoder {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Encodes one event.
    ///
    /// Output is deterministic for a given event; only the uid and stamp
    /// differ between two normalizations of the same fields.
    pub fn encode(&self, event: &CanonicalEvent) -> InterchangeDocument {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", self.product_id),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", event.uid()),
            format!("DTSTAMP:{}", utc_ics_stamp(event.created_at())),
            format!("DTSTART:{}", event.start().to_ics_stamp()),
            format!("DTEND:{}", event.end().to_ics_stamp()),
            format!("SUMMARY:{}", escape_text(event.title())),
        ];

        if let Some(location) = event.location().filter(|v| !is_sentinel(v)) {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(description) = event.description().filter(|v| !is_sentinel(v)) {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }

        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());
        InterchangeDocument::from_lines(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::LocalInstant;
    use chrono::{TimeZone, Utc};

    fn event() -> CanonicalEvent {
        CanonicalEvent::new(
            "20240301T120000-0a1b2c3d@litecal.app",
            "Dentist",
            LocalInstant::new(2024, 3, 10, 14, 0).unwrap(),
            LocalInstant::new(2024, 3, 10, 15, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    mod escaping {
        use super::*;

        #[test]
        fn structural_characters() {
            assert_eq!(escape_text(r"a\b;c,d"), r"a\\b\;c\,d");
        }

        #[test]
        fn every_line_break_style() {
            assert_eq!(escape_text("one\r\ntwo\nthree\rfour"), r"one\ntwo\nthree\nfour");
            assert_eq!(escape_text("\r\n\r\n"), r"\n\n");
        }

        #[test]
        fn drops_control_characters_but_keeps_tab() {
            assert_eq!(escape_text("a\u{7}b\u{1b}c\td"), "abc\td");
        }

        #[test]
        fn plain_text_untouched() {
            assert_eq!(escape_text("Café at 5 – bring cake"), "Café at 5 – bring cake");
        }
    }

    mod document {
        use super::*;

        #[test]
        fn fixed_header_and_footer() {
            let document = CalendarDocumentEncoder::default().encode(&event());
            let lines = document.lines();
            assert_eq!(
                &lines[..6],
                [
                    "BEGIN:VCALENDAR",
                    "VERSION:2.0",
                    "PRODID:-//LiteCal//Event Canonicalizer//EN",
                    "CALSCALE:GREGORIAN",
                    "METHOD:PUBLISH",
                    "BEGIN:VEVENT",
                ]
            );
            assert_eq!(&lines[lines.len() - 2..], ["END:VEVENT", "END:VCALENDAR"]);
        }

        #[test]
        fn instants_and_stamp() {
            let document = CalendarDocumentEncoder::default().encode(&event());
            let lines = document.lines();
            assert!(lines.contains(&"DTSTAMP:20240301T120000Z".to_string()));
            assert!(lines.contains(&"DTSTART:20240310T140000Z".to_string()));
            assert!(lines.contains(&"DTEND:20240310T150000Z".to_string()));
        }

        #[test]
        fn absent_fields_leave_no_line() {
            let document = CalendarDocumentEncoder::default().encode(&event());
            assert!(!document.lines().iter().any(|l| l.starts_with("LOCATION")));
            assert!(!document.lines().iter().any(|l| l.starts_with("DESCRIPTION")));
            assert!(!document.lines().iter().any(|l| l.is_empty()));
            assert_eq!(document.lines().len(), 13);
        }

        #[test]
        fn optional_fields_are_escaped() {
            let event = event()
                .with_location("Suite 4, Main St")
                .with_description("Bring card;\nask about x-rays");
            let document = CalendarDocumentEncoder::default().encode(&event);
            let lines = document.lines();
            assert_eq!(lines[11], r"LOCATION:Suite 4\, Main St");
            assert_eq!(lines[12], r"DESCRIPTION:Bring card\;\nask about x-rays");
        }

        #[test]
        fn custom_product_id() {
            let encoder = CalendarDocumentEncoder::new("-//Acme//Test//EN");
            assert_eq!(encoder.product_id(), "-//Acme//Test//EN");
            assert_eq!(encoder.encode(&event()).lines()[2], "PRODID:-//Acme//Test//EN");
        }

        #[test]
        fn deterministic_for_one_event() {
            let encoder = CalendarDocumentEncoder::default();
            assert_eq!(encoder.encode(&event()), encoder.encode(&event()));
        }
    }
}
