//! Reads event fields back out of a document.
//!
//! This is the inverse of the encoder for the properties it writes. It is
//! used to inspect payloads and never to repair them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::ics::InterchangeDocument;
use crate::time::LocalInstant;

/// Fields of the first `VEVENT` in a document.
///
/// Every field is optional: a structurally valid document may omit any of
/// them, and instants that do not parse are left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedEvent {
    pub uid: Option<String>,
    pub stamp: Option<DateTime<Utc>>,
    pub start: Option<LocalInstant>,
    pub end: Option<LocalInstant>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Unescapes a text value.
///
/// Recognizes `\\`, `\,`, `\;` and `\n`/`\N`. Unknown escapes are kept as
/// written.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') | None => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

/// Joins folded continuation lines (leading space or tab) onto the line
/// before them.
fn unfold(lines: &[String]) -> Vec<String> {
    let mut unfolded: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        match (line.strip_prefix([' ', '\t']), unfolded.last_mut()) {
            (Some(rest), Some(previous)) => previous.push_str(rest),
            _ => unfolded.push(line.clone()),
        }
    }
    unfolded
}

/// Splits `NAME;PARAM=x:value` into the upper-cased name and the raw value.
fn split_property(line: &str) -> Option<(String, &str)> {
    let (head, value) = line.split_once(':')?;
    let name = head.split(';').next().unwrap_or(head).trim();
    Some((name.to_ascii_uppercase(), value))
}

fn parse_utc_stamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parses the first event in the document.
///
/// Returns `None` when the document has no `BEGIN:VEVENT`.
pub fn parse_event(document: &InterchangeDocument) -> Option<ParsedEvent> {
    let lines = unfold(document.lines());
    let mut iter = lines.iter();
    iter.by_ref()
        .find(|line| line.trim().eq_ignore_ascii_case("BEGIN:VEVENT"))?;

    let mut event = ParsedEvent::default();
    for line in iter {
        if line.trim().eq_ignore_ascii_case("END:VEVENT") {
            break;
        }
        let Some((name, value)) = split_property(line) else {
            continue;
        };
        match name.as_str() {
            "UID" => event.uid = Some(value.trim().to_string()),
            "DTSTAMP" => event.stamp = parse_utc_stamp(value),
            "DTSTART" => event.start = LocalInstant::parse_ics_stamp(value),
            "DTEND" => event.end = LocalInstant::parse_ics_stamp(value),
            "SUMMARY" => event.summary = Some(unescape_text(value)),
            "LOCATION" => event.location = Some(unescape_text(value)),
            "DESCRIPTION" => event.description = Some(unescape_text(value)),
            _ => {}
        }
    }

    Some(event)
}
