//! Structural checks for documents received from elsewhere.
//!
//! Only the calendar and event markers are looked at. Field values are
//! never interpreted here.

use crate::error::DocumentInvalid;
use crate::ics::InterchangeDocument;

fn is_marker(line: &str, marker: &str) -> bool {
    line.trim().eq_ignore_ascii_case(marker)
}

/// Checks that the document has a `BEGIN:VCALENDAR`, a later
/// `END:VCALENDAR`, and at least one complete `VEVENT` between them.
pub fn validate(document: &InterchangeDocument) -> Result<(), DocumentInvalid> {
    if document.is_empty() {
        return Err(DocumentInvalid::Empty);
    }

    let lines = document.lines();
    let begin = lines
        .iter()
        .position(|l| is_marker(l, "BEGIN:VCALENDAR"))
        .ok_or(DocumentInvalid::MissingCalendarBegin)?;
    let body = &lines[begin + 1..];
    let end = body
        .iter()
        .position(|l| is_marker(l, "END:VCALENDAR"))
        .ok_or(DocumentInvalid::MissingCalendarEnd)?;

    let mut in_event = false;
    for line in &body[..end] {
        if is_marker(line, "BEGIN:VEVENT") {
            in_event = true;
        } else if in_event && is_marker(line, "END:VEVENT") {
            return Ok(());
        }
    }
    Err(DocumentInvalid::NoCompleteEvent)
}

/// [`validate`] on raw document text.
pub fn validate_text(text: &str) -> Result<(), DocumentInvalid> {
    validate(&InterchangeDocument::from_text(text))
}
