//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod generate;
pub mod init;
pub mod share;
pub mod unshare;
pub mod validate;

use crate::cli::FolderArgs;
use crate::core::exam::StudentFilter;
use crate::core::summary::RunSummary;
use crate::domain::{ExamGenError, Result, StudentId};

/// Builds the student filter from `--only` / `--except`
pub(crate) fn student_filter(args: &FolderArgs) -> Result<StudentFilter> {
    let parse = |ids: &[String]| -> Result<Vec<StudentId>> {
        ids.iter()
            .map(|id| StudentId::new(id.trim()).map_err(ExamGenError::InvalidArgument))
            .collect()
    };
    StudentFilter::from_lists(parse(&args.only)?, parse(&args.except)?)
}

/// Prints the per-student failures of a run
pub(crate) fn print_failures(summary: &RunSummary) {
    if summary.failures.is_empty() {
        return;
    }
    println!("⚠️  Failures:");
    for failure in &summary.failures {
        println!("  - {} ({}): {}", failure.student, failure.stage, failure.message);
    }
    println!();
}
