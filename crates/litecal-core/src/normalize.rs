//! Raw event fields to [`CanonicalEvent`] conversion.
//!
//! The normalization process:
//! 1. Parses `startDate`/`startTime` into a [`LocalInstant`] with no
//!    timezone shift
//! 2. Resolves the end from the raw end fields, or applies the default
//!    duration
//! 3. Collapses placeholder values and builds the [`CanonicalEvent`]
//!
//! An end that does not come after the start is reported as
//! [`NormalizationError::NonMonotonicRange`] rather than guessed to be on
//! the following day.

use chrono::{DateTime, Local, Utc};
use tracing::debug;

use crate::canonicalize::CanonicalizerOptions;
use crate::error::NormalizationError;
use crate::event::{CanonicalEvent, EventFieldsRaw, collapse_sentinel, generate_uid, is_sentinel};
use crate::time::LocalInstant;

/// Parses a `YYYY-MM-DD` date into `(year, month, day)`.
pub fn parse_date(
    field: &'static str,
    value: &str,
) -> Result<(i32, u32, u32), NormalizationError> {
    let parts: Vec<&str> = value.trim().split('-').map(str::trim).collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(NormalizationError::invalid(
            field,
            value,
            "expected YYYY-MM-DD",
        ));
    };

    let year: i32 = parse_component(field, value, year)?;
    let month: u32 = parse_component(field, value, month)?;
    let day: u32 = parse_component(field, value, day)?;

    if !(1..=9999).contains(&year) {
        return Err(NormalizationError::invalid(field, value, "year out of range"));
    }
    if !(1..=12).contains(&month) {
        return Err(NormalizationError::invalid(field, value, "month out of range"));
    }
    if !(1..=31).contains(&day) {
        return Err(NormalizationError::invalid(field, value, "day out of range"));
    }
    Ok((year, month, day))
}

/// Parses an `HH:MM` 24-hour time into `(hour, minute)`.
///
/// A trailing `:SS` is accepted and dropped.
pub fn parse_time(field: &'static str, value: &str) -> Result<(u32, u32), NormalizationError> {
    let parts: Vec<&str> = value.trim().split(':').map(str::trim).collect();
    let (hour, minute, second) = match parts.as_slice() {
        [hour, minute] => (*hour, *minute, None),
        [hour, minute, second] => (*hour, *minute, Some(*second)),
        _ => return Err(NormalizationError::invalid(field, value, "expected HH:MM")),
    };

    let hour: u32 = parse_component(field, value, hour)?;
    let minute: u32 = parse_component(field, value, minute)?;

    if hour > 23 {
        return Err(NormalizationError::invalid(field, value, "hour out of range"));
    }
    if minute > 59 {
        return Err(NormalizationError::invalid(field, value, "minute out of range"));
    }
    if let Some(second) = second {
        let second: u32 = parse_component(field, value, second)?;
        if second > 59 {
            return Err(NormalizationError::invalid(field, value, "second out of range"));
        }
    }
    Ok((hour, minute))
}

fn parse_component<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
    component: &str,
) -> Result<T, NormalizationError> {
    if component.is_empty() || !component.chars().all(|c| c.is_ascii_digit()) {
        return Err(NormalizationError::invalid(field, value, "non-numeric component"));
    }
    component
        .parse()
        .map_err(|_| NormalizationError::invalid(field, value, "component out of range"))
}

/// Combines a date field and a time field into one local instant.
fn parse_instant(
    date_field: &'static str,
    date: &str,
    time_field: &'static str,
    time: &str,
) -> Result<LocalInstant, NormalizationError> {
    let (year, month, day) = parse_date(date_field, date)?;
    let (hour, minute) = parse_time(time_field, time)?;
    LocalInstant::new(year, month, day, hour, minute)
        .ok_or_else(|| NormalizationError::invalid(date_field, date, "no such calendar date"))
}

/// Returns the field's value unless it is absent, blank or a placeholder.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !is_sentinel(v))
}

/// Turns untrusted [`EventFieldsRaw`] into a [`CanonicalEvent`].
#[derive(Debug, Clone)]
pub struct DateTimeNormalizer {
    default_title: String,
    default_duration_minutes: i64,
    uid_domain: String,
}

impl Default for DateTimeNormalizer {
    fn default() -> Self {
        Self::new(&CanonicalizerOptions::default())
    }
}

impl DateTimeNormalizer {
    /// Creates a normalizer from canonicalizer options.
    pub fn new(options: &CanonicalizerOptions) -> Self {
        Self {
            default_title: options.default_title.clone(),
            default_duration_minutes: i64::from(options.default_duration_minutes.max(1)),
            uid_domain: options.uid_domain.clone(),
        }
    }

    /// Normalizes raw fields, stamping the record with the current time.
    pub fn normalize(&self, raw: &EventFieldsRaw) -> Result<CanonicalEvent, NormalizationError> {
        self.normalize_at(raw, Local::now())
    }

    /// Normalizes raw fields at a specific creation time.
    ///
    /// This variant is useful for testing with a fixed time.
    pub fn normalize_at(
        &self,
        raw: &EventFieldsRaw,
        now: DateTime<Local>,
    ) -> Result<CanonicalEvent, NormalizationError> {
        let start = self.parse_start(raw)?;
        let end = self.resolve_end(raw, start)?;
        self.build(raw, start, end, now.with_timezone(&Utc))
    }

    /// Normalizes raw fields ignoring any end date or time.
    ///
    /// The end is always the default duration after the start. This is the
    /// recovery path for [`NormalizationError::NonMonotonicRange`].
    pub fn normalize_with_default_end(
        &self,
        raw: &EventFieldsRaw,
    ) -> Result<CanonicalEvent, NormalizationError> {
        self.normalize_with_default_end_at(raw, Local::now())
    }

    /// [`normalize_with_default_end`](Self::normalize_with_default_end) at a
    /// specific creation time.
    pub fn normalize_with_default_end_at(
        &self,
        raw: &EventFieldsRaw,
        now: DateTime<Local>,
    ) -> Result<CanonicalEvent, NormalizationError> {
        let start = self.parse_start(raw)?;
        let end = self.default_end(start)?;
        self.build(raw, start, end, now.with_timezone(&Utc))
    }

    /// The default end for an event starting at `start`.
    ///
    /// `start` plus the default duration, clipped to 23:59 when that would
    /// cross midnight. A start at 23:59 cannot be clipped and keeps the full
    /// duration.
    ///
    /// # Errors
    ///
    /// [`NormalizationError::InvalidFormat`] on `startTime` when the full
    /// duration would run past the year 9999.
    pub fn default_end(&self, start: LocalInstant) -> Result<LocalInstant, NormalizationError> {
        let clipped = start.end_of_day();
        match start.checked_add_minutes(self.default_duration_minutes) {
            Some(candidate) if candidate.is_same_day(&start) => Ok(candidate),
            _ if clipped > start => Ok(clipped),
            Some(candidate) => Ok(candidate),
            None => Err(NormalizationError::invalid(
                "startTime",
                &start.to_string(),
                "no representable end",
            )),
        }
    }

    /// Builds the one-hour placeholder event used when nothing usable was
    /// extracted.
    pub fn synthetic_at(&self, now: DateTime<Local>) -> CanonicalEvent {
        let created_at = now.with_timezone(&Utc);
        let start = LocalInstant::at(now);
        let end = start.saturating_add_minutes(self.default_duration_minutes);
        CanonicalEvent::from_checked_parts(
            generate_uid(created_at, &self.uid_domain),
            self.default_title.clone(),
            start,
            end,
            created_at,
        )
    }

    fn parse_start(&self, raw: &EventFieldsRaw) -> Result<LocalInstant, NormalizationError> {
        let date = present(&raw.start_date).ok_or(NormalizationError::MissingRequiredField {
            field: "startDate",
        })?;
        let time = present(&raw.start_time).ok_or(NormalizationError::MissingRequiredField {
            field: "startTime",
        })?;
        parse_instant("startDate", date, "startTime", time)
    }

    /// Resolves the end instant from the raw fields.
    ///
    /// Priority: end date and end time together, then end time on the start
    /// date, then the default duration. Unparseable end fields fall through to
    /// the default.
    fn resolve_end(
        &self,
        raw: &EventFieldsRaw,
        start: LocalInstant,
    ) -> Result<LocalInstant, NormalizationError> {
        let end_date = present(&raw.end_date);
        let end_time = present(&raw.end_time);

        let explicit = match (end_date, end_time) {
            (Some(date), Some(time)) => Some(parse_instant("endDate", date, "endTime", time)),
            (None, Some(time)) => Some(parse_time("endTime", time).and_then(|(hour, minute)| {
                LocalInstant::new(start.year(), start.month(), start.day(), hour, minute)
                    .ok_or_else(|| NormalizationError::invalid("endTime", time, "no such time"))
            })),
            _ => None,
        };

        match explicit {
            Some(Ok(end)) => Ok(end),
            Some(Err(err)) => {
                debug!(error = %err, "Ignoring unparseable end, using default duration");
                self.default_end(start)
            }
            None => self.default_end(start),
        }
    }

    fn build(
        &self,
        raw: &EventFieldsRaw,
        start: LocalInstant,
        end: LocalInstant,
        created_at: DateTime<Utc>,
    ) -> Result<CanonicalEvent, NormalizationError> {
        let title = collapse_sentinel(raw.title.as_deref())
            .unwrap_or_else(|| self.default_title.clone());
        let uid = generate_uid(created_at, &self.uid_domain);
        let mut event = CanonicalEvent::new(uid, title, start, end, created_at)?;

        if let Some(location) = present(&raw.location) {
            event = event.with_location(location);
        }
        if let Some(description) = present(&raw.description) {
            event = event.with_description(description);
        }

        debug!(
            uid = %event.uid(),
            start = %event.start(),
            end = %event.end(),
            "Normalized event fields"
        );
        Ok(event)
    }
}
