//! Domain models and types for examgen.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`StudentId`], [`FileId`], [`PermissionId`])
//! - **Roster model** ([`Student`], [`Minutes`])
//! - **Question bank** ([`Exam`], [`Question`], [`Variant`], [`VariantAssignment`])
//! - **Sharing state** ([`ShareSession`], [`SessionStatus`])
//! - **Error types** ([`ExamGenError`], [`RemoteError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ExamGenError>`]:
//!
//! ```rust
//! use examgen::domain::{ExamGenError, Question, Result};
//!
//! fn example() -> Result<()> {
//!     match Question::new("Q1", vec![]) {
//!         Err(ExamGenError::Configuration(msg)) => println!("{msg}"),
//!         _ => unreachable!(),
//!     }
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod exam;
pub mod ids;
pub mod result;
pub mod session;
pub mod student;

// Re-export commonly used types for convenience
pub use errors::{ExamGenError, RemoteError};
pub use exam::{AssignedVariant, Exam, Question, Variant, VariantAssignment};
pub use ids::{FileId, PermissionId, StudentId};
pub use result::Result;
pub use session::{SessionStatus, ShareSession};
pub use student::{Minutes, Student};
