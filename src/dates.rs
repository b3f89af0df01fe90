//! The single day format shared by document dates, session entries and the
//! consistency calendar. Calendar matching compares these strings, so every
//! producer must go through [`format_day`].

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Month/day/year without zero padding, e.g. `1/23/2026`.
pub const DAY_FORMAT: &str = "%-m/%-d/%Y";

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_today() -> String {
    format_day(today())
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

/// Render a server timestamp (RFC 3339) as a local calendar day.
/// Unparseable input is returned unchanged.
pub fn format_timestamp_day(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => format_day(Local.from_utc_datetime(&ts.naive_utc()).date_naive()),
        Err(e) => {
            tracing::debug!(raw = %raw, error = %e, "Timestamp is not RFC 3339");
            raw.to_string()
        }
    }
}
