//! CalDAV-backed [`EventStore`].

use std::borrow::Cow;

use tracing::{debug, info, warn};

use calsync_core::event::RESOURCE_SUFFIX;
use calsync_core::{Event, EventDraft, new_event_id};

use crate::error::{StoreError, StoreErrorCode, StoreResult};
use crate::ics::{decode, encode};
use crate::store::{BoxFuture, DeleteStatus, EventStore};

use super::client::CalDavClient;
use super::config::{FetchMode, StoreConfig};
use super::xml::{calendar_query_body, parse_report_response};

/// Event store talking to a CalDAV collection, one `{id}.ics` resource per
/// event.
pub struct CalDavEventStore {
    client: CalDavClient,
}

impl CalDavEventStore {
    /// Creates a new store with the given configuration.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            client: CalDavClient::new(config)?,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        self.client.config()
    }

    /// Fetches the collection with a plain GET.
    ///
    /// The response ETag belongs to a single resource, so it is attached only
    /// when the body holds exactly one calendar document.
    async fn fetch_with_get(&self) -> StoreResult<Vec<Event>> {
        let url = &self.config().url;
        debug!(url = %url, "Fetching collection with GET");

        let fetched = self.client.get(url).await?;
        let mut events = decode(&fetched.body)?;

        if let Some(etag) = fetched.etag
            && document_count(&fetched.body) == 1
        {
            for event in &mut events {
                event.etag = Some(etag.clone());
            }
        }

        Ok(events)
    }

    /// Fetches the collection with a `calendar-query` REPORT.
    ///
    /// Each resource's events take its ETag, and its id from the resource
    /// name, since that name is what DELETE addresses.
    async fn fetch_with_report(&self) -> StoreResult<Vec<Event>> {
        let url = &self.config().url;
        debug!(url = %url, "Fetching collection with REPORT");

        let response = self.client.report(url, calendar_query_body()?).await?;
        let objects = parse_report_response(&response)?;
        debug!(count = objects.len(), "Received calendar objects");

        let mut events = Vec::new();
        for object in objects {
            let id = resource_id(&object.href);
            for mut event in decode(&object.data)? {
                if let Some(ref id) = id
                    && *id != event.id
                {
                    debug!(uid = %event.id, resource = %id, "UID differs from resource name");
                    event.id = id.clone();
                }
                event.etag = object.etag.clone();
                events.push(event);
            }
        }

        Ok(events)
    }
}

impl EventStore for CalDavEventStore {
    fn name(&self) -> &str {
        "caldav"
    }

    fn fetch_all(&self) -> BoxFuture<'_, StoreResult<Vec<Event>>> {
        Box::pin(async move {
            let events = match self.config().fetch_mode {
                FetchMode::Get => self.fetch_with_get().await?,
                FetchMode::Report => self.fetch_with_report().await?,
            };

            info!(
                url = %self.config().url,
                count = events.len(),
                "Fetched and decoded events"
            );

            Ok(events)
        })
    }

    fn create(&self, draft: EventDraft) -> BoxFuture<'_, StoreResult<Event>> {
        Box::pin(async move {
            draft.validate().map_err(|e| {
                StoreError::write(format!("Refusing to store event: {}", e)).with_source(e)
            })?;

            let id = match draft.id.as_deref() {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => new_event_id(),
            };
            let event = draft.into_event(id);
            let url = self.config().resource_url(&event.id)?;

            debug!(id = %event.id, url = %url, "Storing event");
            self.client.put(&url, encode(&event)).await?;

            info!(id = %event.id, "Created event");
            Ok(event)
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, DeleteStatus> {
        Box::pin(async move {
            let result = match self.config().resource_url(id) {
                Ok(url) => {
                    debug!(id = %id, url = %url, "Deleting event");
                    self.client.delete(&url).await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    info!(id = %id, "Deleted event");
                    DeleteStatus::Deleted
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Delete was not confirmed by the server");
                    DeleteStatus::Warning(into_delete_warning(e))
                }
            }
        })
    }
}

/// Reclassifies any delete failure as a recoverable warning, keeping the
/// HTTP status.
fn into_delete_warning(err: StoreError) -> StoreError {
    if err.code() == StoreErrorCode::StoreDeleteWarning {
        return err;
    }
    let mut warning = StoreError::delete_warning(err.message().to_string());
    if let Some(status) = err.status() {
        warning = warning.with_status(status);
    }
    warning.with_source(err)
}

/// Counts the calendar documents in iCalendar text.
fn document_count(text: &str) -> usize {
    text.lines()
        .filter(|line| line.trim().eq_ignore_ascii_case("BEGIN:VCALENDAR"))
        .count()
}

/// Returns the event id encoded in a resource href, if the href names an
/// `.ics` resource.
fn resource_id(href: &str) -> Option<String> {
    let name = href.trim_end_matches('/').rsplit('/').next()?;
    let decoded = urlencoding::decode(name).unwrap_or(Cow::Borrowed(name));
    let stem = decoded.strip_suffix(RESOURCE_SUFFIX)?;
    (!stem.is_empty()).then(|| stem.to_string())
}
