//! Local wall-clock time for calendar events.
//!
//! Event fields arrive as bare date and time strings with no offset. They are
//! kept exactly as written in a [`LocalInstant`] and never pass through a
//! timezone, so a `2024-03-10` event cannot drift to the 9th because the
//! viewer happens to sit west of UTC.

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc,
};
use serde::{Deserialize, Serialize};

/// Last year an iCalendar `YYYYMMDD` date can carry.
pub const MAX_YEAR: i32 = 9999;

/// A naive local date and time with minute precision.
///
/// A `LocalInstant` only means "this wall-clock reading", whatever zone the
/// reader is in. It never converts to or from an offset-carrying type.
/// Years stay within `1..=9999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalInstant(NaiveDateTime);

impl LocalInstant {
    /// Builds an instant from its components.
    ///
    /// Returns `None` if the date does not exist, the year is outside
    /// `1..=9999`, or the time is out of range.
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        if !(1..=MAX_YEAR).contains(&year) {
            return None;
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(Self(date.and_time(time)))
    }

    /// Wraps a naive datetime, dropping seconds and sub-seconds.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        let truncated = dt
            .with_second(0)
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(dt);
        Self(truncated)
    }

    /// The current local wall-clock minute.
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    /// The wall-clock minute of the given local datetime.
    pub fn at(now: DateTime<Local>) -> Self {
        Self::from_naive(now.naive_local())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Returns the calendar date of this instant.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Returns the underlying naive datetime.
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Adds minutes, returning `None` if the result leaves years `1..=9999`.
    pub fn checked_add_minutes(&self, minutes: i64) -> Option<Self> {
        self.0
            .checked_add_signed(Duration::minutes(minutes))
            .filter(|dt| (1..=MAX_YEAR).contains(&dt.year()))
            .map(Self)
    }

    /// Adds minutes, pinning to 9999-12-31 23:59 on overflow.
    pub fn saturating_add_minutes(&self, minutes: i64) -> Self {
        self.checked_add_minutes(minutes)
            .or_else(|| Self::new(MAX_YEAR, 12, 31, 23, 59))
            .unwrap_or(*self)
    }

    /// Returns 23:59 on the same date.
    pub fn end_of_day(&self) -> Self {
        let last_minute = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        Self(self.date().and_time(last_minute))
    }

    /// Returns true if both instants fall on the same calendar date.
    pub fn is_same_day(&self, other: &LocalInstant) -> bool {
        self.date() == other.date()
    }

    /// Whole minutes from `self` to `later`.
    pub fn minutes_until(&self, later: &LocalInstant) -> i64 {
        (later.0 - self.0).num_minutes()
    }

    /// Formats as an iCalendar date-time, `YYYYMMDDTHHMMSSZ`.
    ///
    /// The trailing `Z` is emitted for compatibility with the calendars that
    /// consume these documents. The value is still naive local time and must
    /// not be read as UTC.
    pub fn to_ics_stamp(&self) -> String {
        format!("{}Z", self.0.format("%Y%m%dT%H%M%S"))
    }

    /// Parses an iCalendar date-time, with or without the trailing `Z`.
    pub fn parse_ics_stamp(value: &str) -> Option<Self> {
        let value = value.trim();
        let value = value.strip_suffix('Z').unwrap_or(value);
        NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
            .ok()
            .map(Self::from_naive)
    }
}

impl fmt::Display for LocalInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M"))
    }
}

/// Formats a true UTC instant as an iCalendar date-time.
pub fn utc_ics_stamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}
