//! Errors raised while validating or normalizing events at the boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building or ingesting events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The event ends before it starts.
    #[error("event ends ({end}) before it starts ({start})")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Neither `startDate` nor the legacy `date` field was present.
    #[error("event has no start date")]
    MissingStart,

    /// A persisted event record carried no identifier.
    #[error("event has no id")]
    MissingId,

    /// A timestamp string could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl CoreError {
    /// Creates an invalid timestamp error.
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp(value.into())
    }
}
