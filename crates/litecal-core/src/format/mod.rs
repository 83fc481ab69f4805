//! Display formatting for canonical events.
//!
//! Everything here is a pure function of its arguments: weekday and date
//! strings, 12-hour times, and title-casing for event titles and locations.
//! The weekday is computed with Zeller's congruence straight from the stored
//! date fields.
//!
//! # Example
//!
//! ```rust
//! use litecal_core::format::{format_date, format_time, title_case};
//!
//! assert_eq!(format_date(2024, 3, 10), "Sunday, March 10, 2024");
//! assert_eq!(format_time(14, 5), "2:05 PM");
//! assert_eq!(title_case("a trip to the lake"), "A Trip to the Lake");
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::event::CanonicalEvent;
use crate::time::LocalInstant;

/// Indexed by Zeller's `h`: 0 is Saturday.
const WEEKDAYS: [&str; 7] = [
    "Saturday",
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Words kept lowercase inside a title unless they open or close it.
const MINOR_WORDS: [&str; 15] = [
    "a", "an", "the", "and", "but", "or", "for", "nor", "on", "at", "to", "from", "by", "in", "of",
];

/// Returns the weekday name of a proleptic Gregorian date.
pub fn weekday(year: i32, month: u32, day: u32) -> &'static str {
    // January and February count as months 13 and 14 of the previous year.
    let (year, month) = if month < 3 {
        (i64::from(year) - 1, i64::from(month) + 12)
    } else {
        (i64::from(year), i64::from(month))
    };
    let day = i64::from(day);

    let h = (day + (13 * (month + 1)).div_euclid(5) + year + year.div_euclid(4)
        - year.div_euclid(100)
        + year.div_euclid(400))
    .rem_euclid(7);
    WEEKDAYS[h as usize]
}

/// Returns the English month name, or `None` outside 1-12.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Formats a date as `"<Weekday>, <Month> <Day>, <Year>"`.
pub fn format_date(year: i32, month: u32, day: u32) -> String {
    format!(
        "{}, {} {}, {}",
        weekday(year, month, day),
        month_name(month).unwrap_or("?"),
        day,
        year
    )
}

/// Formats a 24-hour time on the 12-hour clock, e.g. `"9:05 AM"`.
pub fn format_time(hour: u32, minute: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, minute, suffix)
}

/// Formats the date part of a local instant.
pub fn format_instant_date(instant: &LocalInstant) -> String {
    format_date(instant.year(), instant.month(), instant.day())
}

/// Formats the time part of a local instant.
pub fn format_instant_time(instant: &LocalInstant) -> String {
    format_time(instant.hour(), instant.minute())
}

/// Formats a start/end pair as `"2:00 PM - 3:00 PM"`.
///
/// When the end falls on a later date, its date is spelled out too.
pub fn format_time_range(start: &LocalInstant, end: &LocalInstant) -> String {
    if start.is_same_day(end) {
        format!(
            "{} - {}",
            format_instant_time(start),
            format_instant_time(end)
        )
    } else {
        format!(
            "{} - {} {}",
            format_instant_time(start),
            format_instant_date(end),
            format_instant_time(end)
        )
    }
}

/// Title-cases a phrase.
///
/// Minor words stay lowercase except as the first or last word. Other words
/// get an uppercase first letter and a lowercase tail, unless they are
/// already in mixed case (`iPhone`, `McDonald`). Runs of whitespace collapse
/// to one space.
pub fn title_case(phrase: &str) -> String {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i != 0 && i != last && MINOR_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mixed_case =
        word.chars().any(char::is_uppercase) && word.chars().any(char::is_lowercase);
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if mixed_case => first.to_uppercase().chain(chars).collect(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Title-cases each comma-separated part of a location.
///
/// Empty parts are dropped.
pub fn format_location(location: &str) -> String {
    location
        .split(',')
        .map(title_case)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// Configuration options for display formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Maximum length for event titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
}

/// A display-ready view of an event, as shown on the confirmation card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDisplay {
    /// `"Sunday, March 10, 2024"`.
    pub date: String,
    /// `"2:00 PM - 3:00 PM"`.
    pub time_range: String,
    /// Title-cased title.
    pub title: String,
    /// Title-cased location, if any.
    pub location: Option<String>,
    /// Description as stored.
    pub description: Option<String>,
}

impl EventDisplay {
    /// Creates a display view with default options.
    pub fn from_event(event: &CanonicalEvent) -> Self {
        Self::from_event_with(event, &DisplayOptions::default())
    }

    /// Creates a display view with the given options.
    pub fn from_event_with(event: &CanonicalEvent, options: &DisplayOptions) -> Self {
        let title = title_case(event.title());
        let title = match options.max_title_length {
            Some(max_len) => ellipsis(&title, max_len).into_owned(),
            None => title,
        };

        Self {
            date: format_instant_date(&event.start()),
            time_range: format_time_range(&event.start(), &event.end()),
            title,
            location: event.location().map(format_location),
            description: event.description().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod weekday_tests {
        use super::*;

        #[test]
        fn known_dates() {
            assert_eq!(weekday(2024, 3, 10), "Sunday");
            assert_eq!(weekday(2000, 2, 29), "Tuesday");
            assert_eq!(weekday(1970, 1, 1), "Thursday");
            assert_eq!(weekday(2024, 1, 1), "Monday");
            assert_eq!(weekday(1900, 3, 1), "Thursday");
            assert_eq!(weekday(1600, 1, 1), "Saturday");
        }

        #[test]
        fn january_and_february_use_previous_year() {
            assert_eq!(weekday(2023, 12, 31), "Sunday");
            assert_eq!(weekday(2024, 1, 1), "Monday");
            assert_eq!(weekday(2024, 2, 29), "Thursday");
            assert_eq!(weekday(2024, 3, 1), "Friday");
        }

        #[test]
        fn agrees_with_chrono_across_four_centuries() {
            use chrono::{Datelike, NaiveDate, Weekday};

            let mut date = NaiveDate::from_ymd_opt(1800, 1, 1).unwrap();
            let last = NaiveDate::from_ymd_opt(2200, 12, 31).unwrap();
            while date <= last {
                let expected = match date.weekday() {
                    Weekday::Mon => "Monday",
                    Weekday::Tue => "Tuesday",
                    Weekday::Wed => "Wednesday",
                    Weekday::Thu => "Thursday",
                    Weekday::Fri => "Friday",
                    Weekday::Sat => "Saturday",
                    Weekday::Sun => "Sunday",
                };
                assert_eq!(
                    weekday(date.year(), date.month(), date.day()),
                    expected,
                    "{date}"
                );
                date = date.succ_opt().unwrap();
            }
        }
    }

    mod date_and_time {
        use super::*;

        #[test]
        fn date_strings() {
            assert_eq!(format_date(2024, 3, 10), "Sunday, March 10, 2024");
            assert_eq!(format_date(2000, 2, 29), "Tuesday, February 29, 2000");
            assert_eq!(format_date(2025, 12, 1), "Monday, December 1, 2025");
        }

        #[test]
        fn month_names() {
            assert_eq!(month_name(1), Some("January"));
            assert_eq!(month_name(12), Some("December"));
            assert_eq!(month_name(0), None);
            assert_eq!(month_name(13), None);
        }

        #[test]
        fn twelve_hour_clock() {
            assert_eq!(format_time(0, 0), "12:00 AM");
            assert_eq!(format_time(0, 5), "12:05 AM");
            assert_eq!(format_time(9, 5), "9:05 AM");
            assert_eq!(format_time(11, 59), "11:59 AM");
            assert_eq!(format_time(12, 0), "12:00 PM");
            assert_eq!(format_time(13, 30), "1:30 PM");
            assert_eq!(format_time(23, 59), "11:59 PM");
        }

        #[test]
        fn same_day_range() {
            let start = LocalInstant::new(2024, 3, 10, 14, 0).unwrap();
            let end = LocalInstant::new(2024, 3, 10, 15, 30).unwrap();
            assert_eq!(format_time_range(&start, &end), "2:00 PM - 3:30 PM");
        }

        #[test]
        fn overnight_range_names_end_date() {
            let start = LocalInstant::new(2024, 3, 10, 22, 0).unwrap();
            let end = LocalInstant::new(2024, 3, 11, 1, 0).unwrap();
            assert_eq!(
                format_time_range(&start, &end),
                "10:00 PM - Monday, March 11, 2024 1:00 AM"
            );
        }
    }

    mod title_case_tests {
        use super::*;

        #[test]
        fn minor_words_lowercased_mid_phrase() {
            assert_eq!(title_case("a trip to the lake"), "A Trip to the Lake");
            assert_eq!(
                title_case("DINNER AT THE STEAKHOUSE"),
                "Dinner at the Steakhouse"
            );
        }

        #[test]
        fn first_and_last_minor_words_capitalized() {
            assert_eq!(title_case("the end of"), "The End Of");
            assert_eq!(title_case("a"), "A");
            assert_eq!(title_case("something to look at"), "Something to Look At");
        }

        #[test]
        fn keeps_mixed_case_and_collapses_whitespace() {
            assert_eq!(title_case("  meeting   with NASA  "), "Meeting With Nasa");
            assert_eq!(title_case("iPhone launch"), "IPhone Launch");
            assert_eq!(title_case("lunch at McDonald's"), "Lunch at McDonald's");
            assert_eq!(title_case("ÉCOLE d'été"), "École D'été");
        }

        #[test]
        fn empty_phrase() {
            assert_eq!(title_case(""), "");
            assert_eq!(title_case("   "), "");
        }

        #[test]
        fn locations_title_case_each_component() {
            assert_eq!(
                format_location("the museum of modern art, new york"),
                "The Museum of Modern Art, New York"
            );
            assert_eq!(format_location("room 4,, main st "), "Room 4, Main St");
        }
    }

    mod ellipsis_tests {
        use super::*;

        #[test]
        fn short_string_unchanged() {
            assert_eq!(ellipsis("hello", 10), "hello");
        }

        #[test]
        fn long_string_truncated() {
            assert_eq!(ellipsis("hello world", 8), "hello...");
        }

        #[test]
        fn zero_length() {
            assert_eq!(ellipsis("hello", 0), "");
        }
    }
}
