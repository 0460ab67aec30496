//! What a reconciler operation did, as reported to the UI layer.
//!
//! Every operation returns an [`Outcome`]. Front ends show
//! [`Outcome::message`] as a notification styled by [`Outcome::severity`];
//! the attached store errors are there for logs and diagnostics.

use std::fmt;

use calsync_core::{CoreError, Event};
use calsync_store::StoreError;

/// Which reconciler operation produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Edit,
    Delete,
}

impl Operation {
    /// Returns a lowercase name for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a notification for an outcome should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Returns a lowercase name for this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a reconciler operation.
#[derive(Debug)]
pub enum Outcome {
    /// The replica was replaced with `count` fetched events.
    Loaded { count: usize },

    /// The event was stored and appended to the replica.
    Created { event: Event },

    /// The server confirmed the delete and the event left the replica.
    Deleted { id: String },

    /// The server did not confirm the delete; the event left the replica
    /// anyway.
    DeletedWithWarning { id: String, warning: StoreError },

    /// The old event was replaced by `event`, which has a new id. When the
    /// delete step was not confirmed the old resource may linger on the
    /// server.
    Edited {
        old_id: String,
        event: Event,
        delete_warning: Option<StoreError>,
    },

    /// The store call failed and the replica is unchanged.
    Failed {
        operation: Operation,
        error: StoreError,
    },

    /// The input was rejected before any store call.
    Invalid {
        operation: Operation,
        error: CoreError,
    },

    /// An edit removed the old event but could not store its replacement.
    /// The event is gone from the replica and possibly from the server.
    ReconciliationGap {
        old_id: String,
        delete_warning: Option<StoreError>,
        error: StoreError,
    },

    /// Another mutation of `id` was in flight; nothing was done.
    Rejected { operation: Operation, id: String },
}

impl Outcome {
    /// Returns the notification severity.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Loaded { .. } | Self::Created { .. } | Self::Deleted { .. } => Severity::Success,
            Self::Edited { delete_warning, .. } => {
                if delete_warning.is_some() {
                    Severity::Warning
                } else {
                    Severity::Success
                }
            }
            Self::DeletedWithWarning { .. } | Self::ReconciliationGap { .. } | Self::Rejected { .. } => {
                Severity::Warning
            }
            Self::Failed { .. } | Self::Invalid { .. } => Severity::Error,
        }
    }

    /// Returns the user-facing notification text.
    pub fn message(&self) -> String {
        match self {
            Self::Loaded { count: 1 } => "Loaded 1 event".to_string(),
            Self::Loaded { count } => format!("Loaded {} events", count),
            Self::Created { .. } => "Event created successfully".to_string(),
            Self::Deleted { .. } => "Event deleted successfully".to_string(),
            Self::DeletedWithWarning { .. } => {
                "Event seems to be already deleted on the server, deleted locally".to_string()
            }
            Self::Edited {
                delete_warning: None,
                ..
            } => "Event updated successfully".to_string(),
            Self::Edited {
                delete_warning: Some(_),
                ..
            } => "Event updated, but the previous version may remain on the server".to_string(),
            Self::Failed { operation, .. } => match operation {
                Operation::Load => "Failed to load events".to_string(),
                other => format!("Failed to {} event", other),
            },
            Self::Invalid { error, .. } => format!("Invalid event: {}", error),
            Self::ReconciliationGap { .. } => {
                "Event update was lost: the original was removed but the new version could not be saved"
                    .to_string()
            }
            Self::Rejected { .. } => "Another change to this event is still in progress".to_string(),
        }
    }

    /// Returns the event this outcome produced, if any.
    pub fn event(&self) -> Option<&Event> {
        match self {
            Self::Created { event } | Self::Edited { event, .. } => Some(event),
            _ => None,
        }
    }

    /// Returns the store error behind this outcome, if any.
    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::DeletedWithWarning { warning, .. } => Some(warning),
            Self::Edited { delete_warning, .. } => delete_warning.as_ref(),
            Self::Failed { error, .. } | Self::ReconciliationGap { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns true if the requested change was fully carried out.
    pub fn is_success(&self) -> bool {
        self.severity() == Severity::Success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
