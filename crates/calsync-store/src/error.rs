//! Error types for event store operations.
//!
//! Every failure the codec or the remote store can produce is a
//! [`StoreError`] carrying a [`StoreErrorCode`]. The code decides how the
//! replica layer reacts: a [`StoreErrorCode::StoreDeleteWarning`] is
//! recoverable, everything else aborts the operation it came from.

use std::fmt;
use thiserror::Error;

/// The category of a store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorCode {
    /// The body could not be read as iCalendar at all.
    ParseError,
    /// Transport failure, or a non-success status on a fetch.
    NetworkError,
    /// Non-success status on a create (PUT).
    StoreWriteError,
    /// Non-success status on a delete. Recoverable.
    StoreDeleteWarning,
    /// Missing or invalid configuration.
    ConfigurationError,
    /// Unexpected local failure.
    InternalError,
}

impl StoreErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::StoreWriteError)
    }

    /// Returns true if the caller should proceed as if the operation succeeded.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StoreDeleteWarning)
    }

    /// Returns a machine-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "parse_error",
            Self::NetworkError => "network_error",
            Self::StoreWriteError => "store_write_error",
            Self::StoreDeleteWarning => "store_delete_warning",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by the codec or the remote store.
#[derive(Debug, Error)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    /// HTTP status of the response that caused this error, if any.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Creates a new store error with the given code and message.
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::ParseError, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::NetworkError, message)
    }

    /// Creates a write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::StoreWriteError, message)
    }

    /// Creates a delete warning.
    pub fn delete_warning(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::StoreDeleteWarning, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::InternalError, message)
    }

    /// Records the HTTP status that caused this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Returns true if the caller should carry on regardless.
    pub fn is_recoverable(&self) -> bool {
        self.code.is_recoverable()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

/// A specialized Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
