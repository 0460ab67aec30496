//! Output rendering for terminal and JSON.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use calsync_core::{Event, parse_description};

/// Maximum title width in list output.
pub const MAX_TITLE_LENGTH: usize = 48;

/// JSON output for a list of events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Events in display order.
    pub events: Vec<JsonEvent>,
    /// Number of events returned.
    pub count: usize,
}

/// A single event in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Start time in RFC 3339 format.
    pub start_date: String,
    /// End time in RFC 3339 format.
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Start of the occurrence when the event is one instance of a series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
    /// URLs found in the description.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
}

impl From<&Event> for JsonEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            start_date: event.start_date.to_rfc3339(),
            end_date: event.end_date.to_rfc3339(),
            etag: event.etag.clone(),
            recurrence_id: event.recurrence_id.map(|dt| dt.to_rfc3339()),
            urls: parse_description(&event.description).urls(),
        }
    }
}

/// Builds the JSON document for `events`.
pub fn to_json(events: &[Event]) -> JsonOutput {
    let events: Vec<JsonEvent> = events.iter().map(JsonEvent::from).collect();
    JsonOutput {
        count: events.len(),
        events,
    }
}

/// Formats one event as a list line: `start - end  title  [id]`.
pub fn event_line(event: &Event, date_format: &str) -> String {
    let end_format = if event.start_date.date_naive() == event.end_date.date_naive() {
        "%H:%M"
    } else {
        date_format
    };
    format!(
        "{} - {}  {}  [{}]",
        event.start_date.format(date_format),
        event.end_date.format(end_format),
        ellipsis(&event.title, MAX_TITLE_LENGTH),
        event.id
    )
}

/// Formats an event for `show`, with its description split into fields.
pub fn event_details(event: &Event, date_format: &str) -> String {
    let mut lines = vec![
        format!("id:     {}", event.id),
        format!("title:  {}", event.title),
        format!("start:  {}", event.start_date.format(date_format)),
        format!("end:    {}", event.end_date.format(date_format)),
    ];
    if let Some(occurrence) = event.recurrence_id {
        lines.push(format!("series: occurrence of {}", occurrence.format(date_format)));
    }
    if let Some(ref etag) = event.etag {
        lines.push(format!("etag:   {}", etag));
    }

    let parsed = parse_description(&event.description);
    if !parsed.is_empty() {
        lines.push(String::new());
        for entry in parsed.iter() {
            match entry.label {
                Some(ref label) => lines.push(format!("{}: {}", label, entry.value)),
                None => lines.push(entry.value.clone()),
            }
        }
    }
    lines.join("\n")
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn standup() -> Event {
        Event::new(
            "abc",
            "Standup",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn line_for_same_day_event() {
        assert_eq!(
            event_line(&standup(), "%Y-%m-%d %H:%M"),
            "2024-01-01 09:00 - 09:30  Standup  [abc]"
        );
    }

    #[test]
    fn line_for_multi_day_event() {
        let event = Event::new(
            "x",
            "Offsite",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 3, 17, 0, 0).unwrap(),
        );
        assert_eq!(
            event_line(&event, "%Y-%m-%d %H:%M"),
            "2024-01-01 09:00 - 2024-01-03 17:00  Offsite  [x]"
        );
    }

    #[test]
    fn details_split_description() {
        let event = standup().with_description("Room: 4B\nhttps://meet.example.com/abc");
        let details = event_details(&event, "%H:%M");
        assert!(details.contains("Room: 4B"));
        assert!(details.contains("https://meet.example.com/abc"));
    }

    #[test]
    fn json_collects_urls() {
        let event = standup().with_description("Link: https://meet.example.com/abc");
        let output = to_json(&[event]);
        assert_eq!(output.count, 1);
        assert_eq!(output.events[0].urls, vec!["https://meet.example.com/abc"]);
        assert_eq!(output.events[0].start_date, "2024-01-01T09:00:00+00:00");

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["events"][0]["startDate"], "2024-01-01T09:00:00+00:00");
        assert!(json["events"][0].get("etag").is_none());
    }

    #[test]
    fn ellipsis_truncates() {
        assert_eq!(ellipsis("short", 10), "short");
        assert_eq!(ellipsis("a very long title", 10), "a very ...");
        assert_eq!(ellipsis("anything", 0), "");
    }
}
