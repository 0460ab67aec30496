//! Event types for the local replica.
//!
//! This module provides the two shapes an event takes in calsync:
//! - [`Event`]: a stored event with a fixed identifier, as held by the replica
//! - [`EventDraft`]: user input for a create or an edit, identifier optional
//!
//! Both deserialize from the camelCase JSON shape used by front ends. The
//! legacy `date` field is accepted as an alias for `startDate` and a missing
//! `endDate` falls back to the start; both are resolved here and never
//! travel further.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Suffix of every remote resource name.
pub const RESOURCE_SUFFIX: &str = ".ics";

/// A calendar event held by the replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EventRecord")]
pub struct Event {
    /// Stable identifier; also the remote resource's file stem.
    pub id: String,
    /// Event title, possibly empty.
    pub title: String,
    /// Free text description, possibly empty.
    pub description: String,
    /// When the event starts.
    pub start_date: DateTime<Utc>,
    /// When the event ends, never before `start_date`.
    pub end_date: DateTime<Utc>,
    /// Server revision token, only set on fetched events. Kept verbatim
    /// (`"abc"`, `W/"abc"`) so it can be sent back in `If-Match`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Original start of this occurrence when expanded from a recurrence rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates a new event, clamping `end` to `start` if it lies before it.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            start_date: start,
            end_date: end.max(start),
            etag: None,
            recurrence_id: None,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the ETag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Builder method to mark this event as an occurrence of a recurring one.
    pub fn with_recurrence_id(mut self, occurrence: DateTime<Utc>) -> Self {
        self.recurrence_id = Some(occurrence);
        self
    }

    /// Returns the remote resource name (`{id}.ics`).
    pub fn resource_name(&self) -> String {
        format!("{}{}", self.id, RESOURCE_SUFFIX)
    }

    /// Returns how long the event lasts.
    pub fn duration(&self) -> Duration {
        self.end_date - self.start_date
    }

    /// Returns true if this event was expanded from a recurrence rule.
    pub fn is_occurrence(&self) -> bool {
        self.recurrence_id.is_some()
    }

    /// Returns true if the event starts on the given (UTC) date.
    pub fn starts_on(&self, date: NaiveDate) -> bool {
        self.start_date.date_naive() == date
    }

    /// Returns true if the given (UTC) date lies between the start and end
    /// dates, both inclusive.
    pub fn spans_day(&self, date: NaiveDate) -> bool {
        self.start_date.date_naive() <= date && date <= self.end_date.date_naive()
    }

    /// Returns an editable draft carrying this event's fields and id.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// User input for creating or editing an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EventRecord")]
pub struct EventDraft {
    /// Identifier to store under; a fresh one is generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// When the event starts.
    pub start_date: DateTime<Utc>,
    /// When the event ends.
    pub end_date: DateTime<Utc>,
}

impl EventDraft {
    /// Creates a draft without an id.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            start_date: start,
            end_date: end,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to pin the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns a copy of this draft with its identifier cleared.
    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }

    /// Checks that the draft ends no earlier than it starts.
    pub fn validate(&self) -> CoreResult<()> {
        if self.end_date < self.start_date {
            return Err(CoreError::InvalidTimeRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Turns the draft into a stored event under the given identifier.
    pub fn into_event(self, id: impl Into<String>) -> Event {
        Event {
            id: id.into(),
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            etag: None,
            recurrence_id: None,
        }
    }
}

/// Loose ingestion shape accepted from JSON front ends.
///
/// Only used as the deserialization source of [`Event`] and [`EventDraft`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    etag: Option<String>,
    #[serde(default)]
    recurrence_id: Option<DateTime<Utc>>,
}

impl EventRecord {
    fn times(&self) -> CoreResult<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start_date.or(self.date).ok_or(CoreError::MissingStart)?;
        let end = self.end_date.unwrap_or(start);
        if end < start {
            return Err(CoreError::InvalidTimeRange { start, end });
        }
        Ok((start, end))
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = CoreError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let (start_date, end_date) = record.times()?;
        Ok(Self {
            id: record.id.ok_or(CoreError::MissingId)?,
            title: record.title.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            start_date,
            end_date,
            etag: record.etag,
            recurrence_id: record.recurrence_id,
        })
    }
}

impl TryFrom<EventRecord> for EventDraft {
    type Error = CoreError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let (start_date, end_date) = record.times()?;
        Ok(Self {
            id: record.id,
            title: record.title.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            start_date,
            end_date,
        })
    }
}
