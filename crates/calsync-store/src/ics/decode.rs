use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Property,
};
use tracing::{debug, warn};

use calsync_core::{Event, parse_compact};

use super::recurrence::{MAX_OCCURRENCES, expand_rule};
use crate::error::{StoreError, StoreResult};

/// Decodes iCalendar text into events.
///
/// The text may hold several concatenated `VCALENDAR` documents, each with
/// any number of `VEVENT`s. Recurring events are expanded into occurrences
/// sharing the master's id, capped at [`MAX_OCCURRENCES`] per rule. A
/// `VEVENT` carrying `RECURRENCE-ID` replaces the generated occurrence it
/// overrides.
///
/// Blank text, documents without events and a truncated trailing document
/// all decode to fewer (possibly zero) events. `VEVENT`s lacking `UID` or
/// `DTSTART` are skipped.
///
/// # Errors
///
/// Returns a `ParseError` if the text contains no calendar document, or if a
/// document cannot be parsed.
pub fn decode(text: &str) -> StoreResult<Vec<Event>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let documents = split_documents(text)?;
    let mut events = Vec::new();
    for document in documents {
        let calendar = document
            .parse::<Calendar>()
            .map_err(|e| StoreError::parse(format!("invalid calendar document: {}", e)))?;
        events.extend(decode_calendar(&calendar));
    }

    debug!(count = events.len(), "Decoded events");
    Ok(events)
}

/// Splits text into the `VCALENDAR` documents it contains, re-joined with
/// CRLF line endings.
fn split_documents(text: &str) -> StoreResult<Vec<String>> {
    let mut documents = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        let marker = line.trim();
        if marker.eq_ignore_ascii_case("BEGIN:VCALENDAR") {
            current = Some(vec![marker]);
        } else if marker.eq_ignore_ascii_case("END:VCALENDAR") {
            if let Some(mut lines) = current.take() {
                lines.push(marker);
                documents.push(lines.join("\r\n"));
            }
        } else if let Some(ref mut lines) = current {
            lines.push(line.trim_end_matches('\r'));
        } else if !marker.is_empty() {
            debug!(line = %marker, "Ignoring text outside a calendar document");
        }
    }

    if current.is_some() {
        warn!("Ignoring truncated calendar document");
    } else if documents.is_empty() {
        return Err(StoreError::parse("no calendar document found"));
    }

    Ok(documents)
}

/// A `VEVENT` read into an event, plus what expansion needs.
struct ParsedEvent {
    event: Event,
    rrule: Option<String>,
    exdates: Vec<DateTime<Utc>>,
    recurrence_id: Option<DateTime<Utc>>,
}

fn decode_calendar(calendar: &Calendar) -> Vec<Event> {
    let mut masters = Vec::new();
    let mut overrides: HashMap<(String, DateTime<Utc>), Event> = HashMap::new();

    for component in calendar.iter() {
        let CalendarComponent::Event(vevent) = component else {
            continue;
        };
        let Some(parsed) = parse_event(vevent) else {
            continue;
        };
        match parsed.recurrence_id {
            Some(occurrence) => {
                let event = parsed.event.with_recurrence_id(occurrence);
                overrides.insert((event.id.clone(), occurrence), event);
            }
            None => masters.push(parsed),
        }
    }

    let mut events = Vec::new();
    for master in masters {
        match master.rrule {
            Some(ref rule) => events.extend(expand(&master, rule, &mut overrides)),
            None => events.push(master.event),
        }
    }

    // Overrides whose master is not in this document stand on their own.
    let mut orphans: Vec<Event> = overrides.into_values().collect();
    orphans.sort_by_key(|e| e.start_date);
    events.extend(orphans);

    events
}

fn parse_event(vevent: &icalendar::Event) -> Option<ParsedEvent> {
    let Some(uid) = vevent.get_uid() else {
        warn!("Skipping VEVENT without UID");
        return None;
    };
    let Some(start) = vevent.get_start().map(to_utc) else {
        warn!(uid = %uid, "Skipping VEVENT without DTSTART");
        return None;
    };
    let end = vevent.get_end().map(to_utc).unwrap_or(start);

    // The parser has already unescaped TEXT values.
    let title = vevent.get_summary().unwrap_or_default();
    let description = vevent.get_description().unwrap_or_default();

    let event = Event::new(uid, title, start, end).with_description(description);

    let parsed = ParsedEvent {
        rrule: vevent.property_value("RRULE").map(str::to_string),
        exdates: exdates(vevent),
        recurrence_id: vevent
            .property_value("RECURRENCE-ID")
            .and_then(|v| parse_compact(v).ok()),
        event,
    };

    debug!(
        uid = %parsed.event.id,
        start = %parsed.event.start_date,
        recurring = parsed.rrule.is_some(),
        "Parsed VEVENT"
    );

    Some(parsed)
}

/// Collects the excluded starts of a `VEVENT`.
///
/// `EXDATE` may repeat and each line may list several comma-separated
/// values. `VALUE=DATE` entries exclude midnight UTC; `TZID` entries are read
/// as UTC, the same way `DTSTART` is.
fn exdates(vevent: &icalendar::Event) -> Vec<DateTime<Utc>> {
    let mut exdates: Vec<DateTime<Utc>> = vevent
        .multi_properties()
        .get("EXDATE")
        .into_iter()
        .flatten()
        .map(Property::value)
        .chain(vevent.property_value("EXDATE"))
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .filter_map(|value| match parse_compact(value) {
            Ok(dt) => Some(dt),
            Err(e) => {
                warn!(value = %value, error = %e, "Ignoring unreadable EXDATE");
                None
            }
        })
        .collect();
    exdates.sort();
    exdates.dedup();
    exdates
}

/// Expands a recurring master. An unparseable rule leaves the master as a
/// single event.
fn expand(
    master: &ParsedEvent,
    rule: &str,
    overrides: &mut HashMap<(String, DateTime<Utc>), Event>,
) -> Vec<Event> {
    let event = &master.event;
    let expansion = match expand_rule(event.start_date, rule, &master.exdates, MAX_OCCURRENCES) {
        Ok(expansion) => expansion,
        Err(e) => {
            warn!(uid = %event.id, error = %e, "Keeping recurring event unexpanded");
            return vec![event.clone()];
        }
    };

    if expansion.truncated {
        warn!(
            uid = %event.id,
            limit = MAX_OCCURRENCES,
            "Recurrence truncated at occurrence limit"
        );
    }

    let duration = event.duration();
    expansion
        .occurrences
        .into_iter()
        .map(|start| {
            overrides
                .remove(&(event.id.clone(), start))
                .unwrap_or_else(|| occurrence(event, start, duration))
        })
        .collect()
}

fn occurrence(master: &Event, start: DateTime<Utc>, duration: Duration) -> Event {
    Event {
        start_date: start,
        end_date: start + duration,
        recurrence_id: Some(start),
        ..master.clone()
    }
}

/// Converts an icalendar date or date-time to UTC.
///
/// Dates become midnight UTC. Zoned and floating times are read as UTC.
fn to_utc(dt: DatePerhapsTime) -> DateTime<Utc> {
    match dt {
        DatePerhapsTime::Date(date) => Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)),
        DatePerhapsTime::DateTime(cdt) => match cdt {
            CalendarDateTime::Utc(dt) => dt,
            CalendarDateTime::Floating(naive) => Utc.from_utc_datetime(&naive),
            CalendarDateTime::WithTimezone { date_time, tzid: _ } => {
                Utc.from_utc_datetime(&date_time)
            }
        },
    }
}
