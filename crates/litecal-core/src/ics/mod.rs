//! The calendar-interchange document: a small iCalendar subset.
//!
//! [`encode`] turns a [`CanonicalEvent`](crate::event::CanonicalEvent) into
//! an [`InterchangeDocument`], [`validate`] checks the structural markers of
//! a document received from elsewhere, and [`parse`] reads the event fields
//! back out.

pub mod encode;
pub mod parse;
pub mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::EncodedPayload;

pub use encode::{CalendarDocumentEncoder, DEFAULT_PRODUCT_ID, escape_text};
pub use parse::{ParsedEvent, parse_event, unescape_text};
pub use validate::{validate, validate_text};

/// Line terminator for document text.
pub const CRLF: &str = "\r\n";

/// An ordered sequence of content lines.
///
/// Lines are stored without terminators; [`text`](Self::text) joins them
/// with CRLF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeDocument {
    lines: Vec<String>,
}

impl InterchangeDocument {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Splits document text on CRLF or bare LF.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// The document text, every line terminated by CRLF.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 2).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push_str(CRLF);
        }
        text
    }

    /// The transport-safe form of [`text`](Self::text).
    pub fn encode(&self) -> EncodedPayload {
        EncodedPayload::encode(&self.text())
    }
}

impl fmt::Display for InterchangeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
