//! The local event replica.
//!
//! A [`Replica`] holds the ordered event list every consumer reads. Each
//! mutation swaps in a new snapshot under the channel's lock, so readers see
//! either the old list or the new one, never a half-applied change.
//! Observers [`subscribe`](Replica::subscribe) to be woken on every change.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use calsync_core::Event;

/// An immutable view of the replica at one point in time.
pub type Snapshot = Arc<Vec<Event>>;

/// Ordered, observable collection of events.
#[derive(Debug)]
pub struct Replica {
    tx: watch::Sender<Snapshot>,
}

impl Default for Replica {
    fn default() -> Self {
        Self::new()
    }
}

impl Replica {
    /// Creates an empty replica.
    pub fn new() -> Self {
        Self::with_events(Vec::new())
    }

    /// Creates a replica holding `events`.
    pub fn with_events(events: Vec<Event>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(events));
        Self { tx }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Returns a receiver that is notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    /// Returns true if the replica holds no events.
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Returns true if any event has the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.tx.borrow().iter().any(|e| e.id == id)
    }

    /// Returns the first event with the given id.
    pub fn get(&self, id: &str) -> Option<Event> {
        self.tx.borrow().iter().find(|e| e.id == id).cloned()
    }

    /// Replaces the whole list.
    pub fn replace_all(&self, events: Vec<Event>) {
        trace!(count = events.len(), "Replacing replica contents");
        self.tx.send_replace(Arc::new(events));
    }

    /// Appends an event.
    pub fn push(&self, event: Event) {
        self.tx.send_modify(|events| Arc::make_mut(events).push(event));
    }

    /// Inserts an event at `index`, or appends it when `index` is past the
    /// end.
    pub fn insert_at(&self, index: usize, event: Event) {
        self.tx.send_modify(|events| {
            let events = Arc::make_mut(events);
            let index = index.min(events.len());
            events.insert(index, event);
        });
    }

    /// Removes every event with the given id and returns the position of the
    /// first one removed.
    ///
    /// Occurrences of a recurring event share an id and go together.
    /// Subscribers are only notified when something was removed.
    pub fn remove(&self, id: &str) -> Option<usize> {
        let mut position = None;
        self.tx.send_if_modified(|events| {
            position = events.iter().position(|e| e.id == id);
            if position.is_none() {
                return false;
            }
            Arc::make_mut(events).retain(|e| e.id != id);
            true
        });
        position
    }
}
