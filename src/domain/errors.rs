//! Domain error types
//!
//! This module defines the error hierarchy for examgen. Errors are domain-specific
//! and don't expose third-party types; adapters translate HTTP failures into
//! [`RemoteError`] before they cross into the core.

use thiserror::Error;

/// Main examgen error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum ExamGenError {
    /// Configuration-related errors (missing roster columns, empty question bank, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Conflicting or missing command-line arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An expected singleton lookup (exam folder, class list) returned nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failure reported by the remote document service
    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteError),

    /// Some items of a bulk operation failed while others succeeded
    #[error("Batch partially failed: {failed}/{total} items failed")]
    PartialBatchFailure { failed: usize, total: usize },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ExamGenError {
    /// Returns true for errors that must stop the whole run rather than one student
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExamGenError::Configuration(_)
                | ExamGenError::InvalidArgument(_)
                | ExamGenError::NotFound(_)
                | ExamGenError::Validation(_)
        )
    }
}

/// Remote service errors
///
/// Errors that occur when talking to the document, roster or ledger services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Failed to reach the service
    #[error("Failed to connect to remote service: {0}")]
    ConnectionFailed(String),

    /// The addressed resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx other than 404/429)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be understood
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl RemoteError {
    /// Whether retrying the same request can never succeed
    ///
    /// The retry executor ignores this unless `fail_fast_on_permanent` is enabled.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            RemoteError::NotFound(_)
                | RemoteError::ClientError { .. }
                | RemoteError::InvalidResponse(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExamGenError {
    fn from(err: std::io::Error) -> Self {
        ExamGenError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExamGenError {
    fn from(err: serde_json::Error) -> Self {
        ExamGenError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExamGenError {
    fn from(err: toml::de::Error) -> Self {
        ExamGenError::Configuration(format!("TOML parse error: {err}"))
    }
}
