//! The [`EventStore`] trait.
//!
//! This is the seam between the replica layer and the remote store. The
//! CalDAV implementation lives in [`crate::caldav`]; tests plug in scripted
//! fakes.

use std::future::Future;
use std::pin::Pin;

use calsync_core::{Event, EventDraft};

use crate::error::{StoreError, StoreResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the replica layer can hold an
/// `Arc<dyn EventStore>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How a delete request ended.
///
/// A delete never fails hard: a rejected request is reported as a warning and
/// the caller removes the event locally anyway.
#[derive(Debug)]
pub enum DeleteStatus {
    /// The server confirmed the removal.
    Deleted,
    /// The server rejected the request or could not be reached.
    Warning(StoreError),
}

impl DeleteStatus {
    /// Returns true if the server confirmed the removal.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Returns the warning, if any.
    pub fn warning(&self) -> Option<&StoreError> {
        match self {
            Self::Deleted => None,
            Self::Warning(err) => Some(err),
        }
    }

    /// Converts into the warning, if any.
    pub fn into_warning(self) -> Option<StoreError> {
        match self {
            Self::Deleted => None,
            Self::Warning(err) => Some(err),
        }
    }
}

/// A remote collection of events, one resource per event id.
pub trait EventStore: Send + Sync {
    /// Returns a short name for logs (e.g. "caldav").
    fn name(&self) -> &str;

    /// Fetches every event in the collection.
    ///
    /// Recurring events arrive already expanded into occurrences.
    ///
    /// # Errors
    ///
    /// `NetworkError` on transport failure or a non-success status,
    /// `ParseError` if the body is not iCalendar.
    fn fetch_all(&self) -> BoxFuture<'_, StoreResult<Vec<Event>>>;

    /// Stores a new event and returns it under its assigned id.
    ///
    /// A fresh id is generated when the draft carries none.
    ///
    /// # Errors
    ///
    /// `StoreWriteError` on a non-success status, `NetworkError` on transport
    /// failure.
    fn create(&self, draft: EventDraft) -> BoxFuture<'_, StoreResult<Event>>;

    /// Removes the resource for `id`.
    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, DeleteStatus>;
}
