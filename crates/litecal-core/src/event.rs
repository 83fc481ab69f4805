//! Event types for calendar events.
//!
//! This module provides the two ends of canonicalization:
//! - [`EventFieldsRaw`]: untrusted fields as extracted upstream
//! - [`CanonicalEvent`]: a validated, immutable event record
//!
//! and the record handed to the device calendar, [`DeviceCalendarRequest`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NormalizationError;
use crate::time::LocalInstant;

/// Title used when the extracted title is missing.
pub const DEFAULT_TITLE: &str = "Calendar Event";

/// Domain suffix appended to generated event identifiers.
pub const DEFAULT_UID_DOMAIN: &str = "litecal.app";

/// Placeholder strings the extraction step uses to mean "no value".
const SENTINELS: &[&str] = &["none", "null", "n/a", "not specified", "unspecified"];

/// Returns true if `value` carries no information.
///
/// Blank strings, strings made only of control characters and the
/// placeholder words used upstream (`None`, `Not specified`, ...) all count,
/// case-insensitively.
pub fn is_sentinel(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.chars().all(char::is_control) {
        return true;
    }
    SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

/// Trims `value` and collapses sentinels to `None`.
pub fn collapse_sentinel(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !is_sentinel(v))
        .map(|v| v.trim().to_string())
}

/// Event fields as produced by the extraction step.
///
/// Nothing here is trusted: any field may be absent, blank, a placeholder
/// word, or malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFieldsRaw {
    pub title: Option<String>,
    /// `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// `HH:MM`, 24-hour.
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventFieldsRaw {
    /// Creates raw fields with a start date and time.
    pub fn new(start_date: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            start_time: Some(start_time.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Generates an event identifier: creation timestamp, random suffix, domain.
///
/// Uniqueness needs no shared counter: the random part separates calls made
/// within the same second.
pub fn generate_uid(created_at: DateTime<Utc>, domain: &str) -> String {
    let entropy = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}@{}",
        created_at.format("%Y%m%dT%H%M%S"),
        &entropy[..8],
        domain
    )
}

/// A fully normalized calendar event.
///
/// Produced once per canonicalization and never mutated afterwards; the
/// fields are only reachable through accessors. Always satisfies
/// `end > start` and has a non-empty title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalEvent {
    uid: String,
    title: String,
    start: LocalInstant,
    end: LocalInstant,
    location: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl CanonicalEvent {
    /// Creates an event, checking that it ends after it starts.
    ///
    /// A blank or placeholder title is replaced with [`DEFAULT_TITLE`].
    pub fn new(
        uid: impl Into<String>,
        title: impl Into<String>,
        start: LocalInstant,
        end: LocalInstant,
        created_at: DateTime<Utc>,
    ) -> Result<Self, NormalizationError> {
        if end <= start {
            return Err(NormalizationError::NonMonotonicRange { start, end });
        }
        Ok(Self::from_checked_parts(
            uid.into(),
            title.into(),
            start,
            end,
            created_at,
        ))
    }

    /// Builds an event whose range the caller has already checked.
    pub(crate) fn from_checked_parts(
        uid: String,
        title: String,
        start: LocalInstant,
        end: LocalInstant,
        created_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(end > start, "canonical events end after they start");
        let title =
            collapse_sentinel(Some(title.as_str())).unwrap_or_else(|| DEFAULT_TITLE.to_string());
        Self {
            uid,
            title,
            start,
            end,
            location: None,
            description: None,
            created_at,
        }
    }

    /// Builder method to set the location; placeholders leave it unset.
    pub fn with_location(mut self, location: impl AsRef<str>) -> Self {
        self.location = collapse_sentinel(Some(location.as_ref()));
        self
    }

    /// Builder method to set the description; placeholders leave it unset.
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        self.description = collapse_sentinel(Some(description.as_ref()));
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> LocalInstant {
        self.start
    }

    pub fn end(&self) -> LocalInstant {
        self.end
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// When this record was created, in UTC. Used as the document stamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the duration of the event in minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.start.minutes_until(&self.end)
    }

    /// Returns the fields the device-calendar bridge needs to create this event.
    pub fn device_calendar_request(&self, reminder_minutes: u32) -> DeviceCalendarRequest {
        DeviceCalendarRequest {
            title: self.title.clone(),
            start: self.start,
            end: self.end,
            location: self.location.clone(),
            notes: self.description.clone(),
            reminder_minutes,
        }
    }

    /// Suggested export filename: the title with every character that is
    /// not an ASCII letter or digit replaced by `_`, plus `.ics`.
    pub fn suggested_filename(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}.ics", stem)
    }
}

/// What the device-calendar collaborator needs to create an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCalendarRequest {
    pub title: String,
    pub start: LocalInstant,
    pub end: LocalInstant,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Minutes before the start at which to raise an alert.
    pub reminder_minutes: u32,
}
