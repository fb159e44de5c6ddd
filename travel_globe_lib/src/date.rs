use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Canonical persisted date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Tried in order after RFC 3339. Slash dates are read month first.
const ACCEPTED_FORMATS: &[&str] = &[
    DATE_FORMAT,
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Strict `YYYY-MM-DD` shape check. Says nothing about whether the date exists.
pub fn is_iso_date_format(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Interprets `value` as a calendar date in any of the accepted layouts.
/// Timestamps are reduced to their UTC date.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(timestamp.date());
    }

    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Normalizes any accepted layout to `YYYY-MM-DD`.
pub fn normalize_date(value: &str) -> Option<String> {
    parse_calendar_date(value).map(|date| date.format(DATE_FORMAT).to_string())
}

pub fn year_of(value: &str) -> Option<i32> {
    parse_calendar_date(value).map(|date| date.year())
}
