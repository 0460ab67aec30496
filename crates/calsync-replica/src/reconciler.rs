//! The reconciler: user intents in, store calls out, replica kept in step.
//!
//! Rules:
//! - `load` replaces the replica wholesale
//! - `create` appends only after the store accepted the event
//! - `delete` always removes locally, whatever the store answered
//! - `edit` is delete followed by create under a fresh id; if the create
//!   fails the event is gone from the replica and a
//!   [`Outcome::ReconciliationGap`] is reported
//!
//! Replica changes happen only after the store call they depend on has
//! resolved. Operations on the same id are not serialized unless
//! [`ReconcilerConfig::exclusive_ids`] is set, in which case the later one
//! is rejected.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use calsync_core::EventDraft;
use calsync_store::EventStore;

use crate::guard::{IdClaim, InFlightIds};
use crate::outcome::{Operation, Outcome};
use crate::replica::{Replica, Snapshot};

/// Reconciler settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Reject an edit or delete of an id that already has one in flight.
    pub exclusive_ids: bool,
}

impl ReconcilerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether concurrent mutations of one id are rejected.
    pub fn with_exclusive_ids(mut self, exclusive: bool) -> Self {
        self.exclusive_ids = exclusive;
        self
    }
}

/// Owns the replica and applies user intents to it through an [`EventStore`].
pub struct Reconciler {
    store: Arc<dyn EventStore>,
    replica: Replica,
    config: ReconcilerConfig,
    in_flight: InFlightIds,
}

impl Reconciler {
    /// Creates a reconciler with an empty replica.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_config(store, ReconcilerConfig::default())
    }

    /// Creates a reconciler with the given configuration.
    pub fn with_config(store: Arc<dyn EventStore>, config: ReconcilerConfig) -> Self {
        Self {
            store,
            replica: Replica::new(),
            config,
            in_flight: InFlightIds::new(),
        }
    }

    /// Returns the replica.
    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    /// Returns the current snapshot of the replica.
    pub fn snapshot(&self) -> Snapshot {
        self.replica.snapshot()
    }

    /// Subscribes to replica changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.replica.subscribe()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Replaces the replica with everything the store holds.
    ///
    /// On failure the replica keeps its previous contents.
    pub async fn load(&self) -> Outcome {
        debug!(store = %self.store.name(), "Loading events");
        match self.store.fetch_all().await {
            Ok(events) => {
                let count = events.len();
                self.replica.replace_all(events);
                info!(count, "Replica loaded");
                Outcome::Loaded { count }
            }
            Err(error) => {
                warn!(error = %error, "Failed to load events");
                Outcome::Failed {
                    operation: Operation::Load,
                    error,
                }
            }
        }
    }

    /// Stores a new event and appends it to the replica.
    pub async fn create(&self, draft: EventDraft) -> Outcome {
        if let Err(error) = draft.validate() {
            return Outcome::Invalid {
                operation: Operation::Create,
                error,
            };
        }

        match self.store.create(draft).await {
            Ok(event) => {
                self.replica.push(event.clone());
                info!(id = %event.id, "Event created");
                Outcome::Created { event }
            }
            Err(error) => {
                warn!(error = %error, "Failed to create event");
                Outcome::Failed {
                    operation: Operation::Create,
                    error,
                }
            }
        }
    }

    /// Deletes an event.
    ///
    /// The event leaves the replica whether or not the store confirmed the
    /// delete; only the reported outcome differs.
    pub async fn delete(&self, id: &str) -> Outcome {
        let _claim = match self.claim(Operation::Delete, id) {
            Ok(claim) => claim,
            Err(rejected) => return rejected,
        };

        let status = self.store.delete(id).await;
        self.replica.remove(id);

        match status.into_warning() {
            None => {
                info!(id = %id, "Event deleted");
                Outcome::Deleted { id: id.to_string() }
            }
            Some(warning) => {
                warn!(id = %id, warning = %warning, "Event deleted locally only");
                Outcome::DeletedWithWarning {
                    id: id.to_string(),
                    warning,
                }
            }
        }
    }

    /// Replaces event `old_id` with a new event built from `draft`.
    ///
    /// The old resource is deleted and the draft is stored under a fresh id;
    /// any id on the draft is ignored. The replacement takes the old event's
    /// position in the replica.
    pub async fn edit(&self, old_id: &str, draft: EventDraft) -> Outcome {
        if let Err(error) = draft.validate() {
            return Outcome::Invalid {
                operation: Operation::Edit,
                error,
            };
        }

        let _claim = match self.claim(Operation::Edit, old_id) {
            Ok(claim) => claim,
            Err(rejected) => return rejected,
        };

        let delete_warning = self.store.delete(old_id).await.into_warning();
        if let Some(ref warning) = delete_warning {
            warn!(id = %old_id, warning = %warning, "Old event may remain on the server");
        }
        let position = self.replica.remove(old_id);

        match self.store.create(draft.without_id()).await {
            Ok(event) => {
                match position {
                    Some(index) => self.replica.insert_at(index, event.clone()),
                    None => self.replica.push(event.clone()),
                }
                info!(old_id = %old_id, new_id = %event.id, "Event edited");
                Outcome::Edited {
                    old_id: old_id.to_string(),
                    event,
                    delete_warning,
                }
            }
            Err(error) => {
                warn!(
                    old_id = %old_id,
                    error = %error,
                    delete_confirmed = delete_warning.is_none(),
                    "Edit lost: old event removed, replacement not stored"
                );
                Outcome::ReconciliationGap {
                    old_id: old_id.to_string(),
                    delete_warning,
                    error,
                }
            }
        }
    }

    /// Claims `id` when exclusive ids are enabled.
    fn claim(&self, operation: Operation, id: &str) -> Result<Option<IdClaim<'_>>, Outcome> {
        if !self.config.exclusive_ids {
            return Ok(None);
        }
        match self.in_flight.try_claim(id) {
            Some(claim) => Ok(Some(claim)),
            None => {
                warn!(id = %id, operation = %operation, "Rejected: mutation already in flight");
                Err(Outcome::Rejected {
                    operation,
                    id: id.to_string(),
                })
            }
        }
    }
}
