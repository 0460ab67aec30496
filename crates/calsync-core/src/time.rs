//! Timestamp helpers.
//!
//! iCalendar carries instants in the compact UTC form `YYYYMMDDTHHMMSSZ`.
//! This module converts between that form and [`chrono`] instants, accepts
//! the looser shapes users type, and provides the day queries calendar views
//! use to pick events.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{CoreError, CoreResult};
use crate::event::Event;

/// `strftime` pattern of the compact UTC form.
pub const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Formats an instant as `YYYYMMDDTHHMMSSZ`.
///
/// Sub-second precision is dropped.
pub fn format_compact(dt: DateTime<Utc>) -> String {
    dt.format(COMPACT_FORMAT).to_string()
}

/// Parses an iCalendar date or date-time value into a UTC instant.
///
/// Handles formats like:
/// - 20250205T100000Z (UTC)
/// - 20250205T100000 (floating, read as UTC)
/// - 20250205 (date only, midnight UTC)
pub fn parse_compact(value: &str) -> CoreResult<DateTime<Utc>> {
    let s = value.trim();

    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        let date = NaiveDate::parse_from_str(s, "%Y%m%d")
            .map_err(|_| CoreError::invalid_timestamp(value))?;
        return Ok(midnight(date));
    }

    let naive = s.strip_suffix('Z').unwrap_or(s);
    NaiveDateTime::parse_from_str(naive, "%Y%m%dT%H%M%S")
        .map(|dt| Utc.from_utc_datetime(&dt))
        .map_err(|_| CoreError::invalid_timestamp(value))
}

/// Parses a user-supplied instant.
///
/// Accepts RFC 3339 (`2024-01-01T09:00:00Z`, any offset), the compact
/// iCalendar form, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD HH:MM[:SS]` read as
/// UTC, and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(value: &str) -> CoreResult<DateTime<Utc>> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for pattern in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight(date));
    }

    parse_compact(s).map_err(|_| CoreError::invalid_timestamp(value))
}

/// Returns the events that start on `date` (UTC), in chronological order.
pub fn events_on_day(events: &[Event], date: NaiveDate) -> Vec<Event> {
    let mut day: Vec<Event> = events
        .iter()
        .filter(|event| event.starts_on(date))
        .cloned()
        .collect();
    sort_chronologically(&mut day);
    day
}

/// Sorts events by start, then end, then id so the order is total.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then(a.end_date.cmp(&b.end_date))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}
