//! Event commands: list, show, create, edit, delete.
//!
//! Each invocation builds a fresh reconciler, so every command that reads
//! the calendar loads it from the store first.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use calsync_core::{Event, EventDraft, events_on_day, parse_instant, sort_chronologically};
use calsync_replica::{Outcome, Reconciler, Severity};
use calsync_store::{CalDavEventStore, StoreConfig};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render;

/// Builds the store configuration from the config file and CLI overrides.
pub fn store_config(cli: &Cli, config: &ClientConfig) -> ClientResult<StoreConfig> {
    let mut settings = config.store.clone();
    if let Some(ref url) = cli.url {
        settings.url = Some(url.clone());
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout_secs = timeout;
    }
    settings.to_store_config().map_err(ClientError::Config)
}

/// Creates a reconciler over the configured store.
pub fn connect(cli: &Cli, config: &ClientConfig) -> ClientResult<Reconciler> {
    let store_config = store_config(cli, config)?;
    debug!(url = %store_config.url, mode = %store_config.fetch_mode, "Connecting");
    let store = CalDavEventStore::new(store_config)?;
    Ok(Reconciler::new(Arc::new(store)))
}

/// Lists events, optionally only those starting on `day`.
pub async fn list(
    reconciler: &Reconciler,
    config: &ClientConfig,
    day: Option<&str>,
    json: bool,
) -> ClientResult<()> {
    load(reconciler).await?;

    let snapshot = reconciler.snapshot();
    let events = match day {
        Some(day) => events_on_day(&snapshot, parse_day(day)?),
        None => {
            let mut events = snapshot.to_vec();
            sort_chronologically(&mut events);
            events
        }
    };

    if json {
        print_json(&render::to_json(&events))?;
    } else if events.is_empty() {
        println!("No events");
    } else {
        for event in &events {
            println!("{}", render::event_line(event, &config.display.date_format));
        }
    }
    Ok(())
}

/// Shows one event.
pub async fn show(
    reconciler: &Reconciler,
    config: &ClientConfig,
    id: &str,
    json: bool,
) -> ClientResult<()> {
    load(reconciler).await?;

    let event = reconciler
        .replica()
        .get(id)
        .ok_or_else(|| ClientError::NotFound(id.to_string()))?;

    if json {
        print_json(&render::JsonEvent::from(&event))?;
    } else {
        println!("{}", render::event_details(&event, &config.display.date_format));
    }
    Ok(())
}

/// Creates an event and prints its id.
pub async fn create(
    reconciler: &Reconciler,
    title: String,
    start: &str,
    end: Option<&str>,
    description: String,
) -> ClientResult<()> {
    let start = parse_time(start)?;
    let end = end.map(parse_time).transpose()?.unwrap_or(start);
    let draft = EventDraft::new(title, start, end).with_description(description);

    let outcome = reconciler.create(draft).await;
    if let Some(event) = outcome.event() {
        println!("{}", event.id);
    }
    report(outcome)
}

/// Replaces an event with an edited copy under a new id.
pub async fn edit(
    reconciler: &Reconciler,
    id: &str,
    changes: EventChanges,
) -> ClientResult<()> {
    load(reconciler).await?;

    let current = reconciler
        .replica()
        .get(id)
        .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
    if let Some(notice) = series_notice(&current) {
        warn!(id = %current.id, "Editing one occurrence of a recurring event");
        eprintln!("warning: {}", notice);
    }
    let draft = changes.apply(current.to_draft())?;

    let outcome = reconciler.edit(id, draft).await;
    if let Some(event) = outcome.event() {
        println!("{}", event.id);
    }
    report(outcome)
}

/// Notice shown before editing an event expanded from a recurrence rule.
///
/// The edit replaces the whole series resource with one plain event.
pub fn series_notice(event: &Event) -> Option<String> {
    event.recurrence_id.map(|occurrence| {
        format!(
            "`{}` is the occurrence of {} in a recurring series; the whole series \
             will be replaced by a single event",
            event.id,
            occurrence.format("%Y-%m-%d %H:%M")
        )
    })
}

/// Deletes an event.
pub async fn delete(reconciler: &Reconciler, id: &str) -> ClientResult<()> {
    report(reconciler.delete(id).await)
}

/// Field overrides for `edit`.
#[derive(Debug, Default, Clone)]
pub struct EventChanges {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
}

impl EventChanges {
    /// Applies the overrides to `draft`.
    ///
    /// When only the start moves, the end moves with it so the duration is
    /// kept.
    pub fn apply(self, mut draft: EventDraft) -> ClientResult<EventDraft> {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }

        let duration = draft.end_date - draft.start_date;
        if let Some(ref start) = self.start {
            draft.start_date = parse_time(start)?;
            draft.end_date = draft.start_date + duration;
        }
        if let Some(ref end) = self.end {
            draft.end_date = parse_time(end)?;
        }
        Ok(draft)
    }
}

/// Prints an outcome's notification and turns error outcomes into errors.
pub fn report(outcome: Outcome) -> ClientResult<()> {
    match outcome.severity() {
        Severity::Success => {
            println!("{}", outcome.message());
            Ok(())
        }
        Severity::Warning => {
            match outcome.error() {
                Some(err) => eprintln!("warning: {} ({})", outcome.message(), err),
                None => eprintln!("warning: {}", outcome.message()),
            }
            Ok(())
        }
        Severity::Error => Err(ClientError::Operation(describe(&outcome))),
    }
}

async fn load(reconciler: &Reconciler) -> ClientResult<()> {
    let outcome = reconciler.load().await;
    debug!(result = %outcome, "Load finished");
    match outcome.severity() {
        Severity::Error => Err(ClientError::Operation(describe(&outcome))),
        _ => Ok(()),
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome.error() {
        Some(err) => format!("{}: {}", outcome.message(), err),
        None => outcome.message(),
    }
}

fn parse_time(value: &str) -> ClientResult<DateTime<Utc>> {
    Ok(parse_instant(value)?)
}

fn parse_day(value: &str) -> ClientResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ClientError::Input(format!("invalid day `{}` (expected YYYY-MM-DD)", value)))
}

fn print_json<T: serde::Serialize>(value: &T) -> ClientResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Operation(format!("failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
