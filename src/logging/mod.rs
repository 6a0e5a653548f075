//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output filtered by level or `RUST_LOG`
//! - JSON-formatted local log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use examgen::logging::init_logging;
//! use examgen::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(folder = "Midterm", "Generating exams");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the completion of a command run
///
/// # Example
///
/// ```no_run
/// use examgen::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!("generate", 30, 2, Duration::from_secs(12));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($command:expr, $succeeded:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            command = $command,
            succeeded = $succeeded,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use examgen::log_error_with_context;
/// use examgen::domain::ExamGenError;
///
/// let error = ExamGenError::NotFound("ClassList".to_string());
/// log_error_with_context!(&error, "Failed to load roster");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log the outcome of a bulk mutation
///
/// # Example
///
/// ```no_run
/// use examgen::log_batch_outcome;
///
/// log_batch_outcome!("revoke", 9, 1);
/// ```
#[macro_export]
macro_rules! log_batch_outcome {
    ($kind:expr, $succeeded:expr, $failed:expr) => {
        tracing::debug!(
            kind = $kind,
            succeeded = $succeeded,
            failed = $failed,
            total = $succeeded + $failed,
            "Batch resolved"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use examgen::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!("copy Q1a", 2, 10, Duration::from_secs(2), "Server error: 503");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($operation:expr, $attempt:expr, $max_attempts:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            operation = $operation,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
