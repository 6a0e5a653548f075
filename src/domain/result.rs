//! Result type alias for examgen

use super::errors::ExamGenError;

/// Result type alias for examgen operations
///
/// # Examples
///
/// ```
/// use examgen::domain::result::Result;
/// use examgen::domain::errors::ExamGenError;
///
/// fn failing_function() -> Result<()> {
///     Err(ExamGenError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExamGenError>;
