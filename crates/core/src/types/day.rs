//! Calendar-day and class-time parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Errors from [`normalize_day`] and [`parse_class_time`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DayError {
    #[error("invalid date '{0}', expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Reduce a client-supplied date or timestamp to the calendar day it names.
///
/// Accepts `2024-03-01`, `2024-03-01T18:45:00`, and RFC 3339 timestamps. The
/// time of day is discarded; for offset timestamps the day is taken in the
/// offset the client sent, so `2024-03-01T23:30:00+05:00` is the 1st.
///
/// # Errors
///
/// Returns [`DayError::InvalidDate`] if no accepted format matches.
pub fn normalize_day(input: &str) -> Result<NaiveDate, DayError> {
    let s = input.trim();

    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }

    Err(DayError::InvalidDate(input.to_owned()))
}

/// Parse a 24-hour `HH:MM` class time.
///
/// # Errors
///
/// Returns [`DayError::InvalidTime`] if the input is not a valid `HH:MM` time.
pub fn parse_class_time(input: &str) -> Result<NaiveTime, DayError> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| DayError::InvalidTime(input.to_owned()))
}
