//! Run summary and exit-code policy

use crate::domain::{ExamGenError, RemoteError};
use std::fmt;
use std::time::Duration;

/// Where a per-student failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Building the workspace
    Assembly,
    /// Locating the workspace for sharing
    Workspace,
    /// Granting access
    Grant,
    /// Revoking access
    Revoke,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Assembly => write!(f, "assembly"),
            FailureStage::Workspace => write!(f, "workspace"),
            FailureStage::Grant => write!(f, "grant"),
            FailureStage::Revoke => write!(f, "revoke"),
        }
    }
}

/// A failure that affected one student only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFailure {
    pub student: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Summary of one `generate`, `share` or `unshare` run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Command that produced the summary
    pub command: &'static str,

    /// Exam folder name
    pub exam: String,

    /// Students selected by the filter
    pub students: usize,

    /// Students fully processed
    pub succeeded: usize,

    /// Students needing no work (already shared, already revoked)
    pub skipped: usize,

    /// Per-student failures
    pub failures: Vec<StudentFailure>,

    /// Ledger spreadsheet written by `generate`
    pub ledger_url: Option<String>,

    /// Shares still granted when the run ended
    pub still_shared: usize,

    /// The run was cut short by a shutdown signal
    pub interrupted: bool,

    pub duration: Duration,
}

impl RunSummary {
    pub fn new(command: &'static str, exam: impl Into<String>) -> Self {
        Self {
            command,
            exam: exam.into(),
            students: 0,
            succeeded: 0,
            skipped: 0,
            failures: Vec::new(),
            ledger_url: None,
            still_shared: 0,
            interrupted: false,
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_failure(&mut self, student: impl Into<String>, stage: FailureStage, error: &ExamGenError) {
        self.failures.push(StudentFailure {
            student: student.into(),
            stage,
            message: error.to_string(),
        });
    }

    pub fn is_successful(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// 0 success, 1 some students failed, 130 interrupted
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if !self.failures.is_empty() {
            1
        } else {
            0
        }
    }

    pub fn log_summary(&self) {
        crate::log_run_complete!(self.command, self.succeeded, self.failures.len(), self.duration);
        tracing::debug!(
            exam = %self.exam,
            students = self.students,
            skipped = self.skipped,
            still_shared = self.still_shared,
            interrupted = self.interrupted,
            "Run details"
        );
        for failure in &self.failures {
            tracing::warn!(
                student = %failure.student,
                stage = %failure.stage,
                error = %failure.message,
                "Student not processed"
            );
        }
    }
}

/// Exit code for an error that aborted the whole run
///
/// 2 configuration or argument problems, 4 the service could not be reached,
/// 5 anything else.
pub fn error_exit_code(error: &ExamGenError) -> i32 {
    match error {
        ExamGenError::Configuration(_)
        | ExamGenError::InvalidArgument(_)
        | ExamGenError::NotFound(_)
        | ExamGenError::Validation(_) => 2,
        ExamGenError::Remote(RemoteError::ConnectionFailed(_) | RemoteError::Timeout(_)) => 4,
        _ => 5,
    }
}
