//! Exam coordinator - runs the generate, share and unshare workflows
//!
//! Configuration-level failures (missing exam folder, class list, question
//! bank, ledger) abort the run with an error. Failures affecting one student
//! are collected in the [`RunSummary`] and the remaining students continue.

use crate::adapters::google::{DriveClient, SheetsClient};
use crate::adapters::store::{DocumentStore, LedgerSink, RosterSource};
use crate::config::ExamGenConfig;
use crate::core::assembly::{ledger_title, ExamAssembler, VariantLedger};
use crate::core::exam::{load_roster, ExamLocator, StudentFilter};
use crate::core::retry::{RetryExecutor, RetryPolicy};
use crate::core::sharing::{AccessScheduler, ShareTarget};
use crate::core::summary::{FailureStage, RunSummary};
use crate::domain::ids::{FileId, StudentId};
use crate::domain::{ExamGenError, Minutes, Result, Student, VariantAssignment};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Exam coordinator
pub struct ExamCoordinator {
    config: ExamGenConfig,
    store: Arc<dyn DocumentStore>,
    roster: Arc<dyn RosterSource>,
    ledger: Arc<dyn LedgerSink>,
    retry: RetryExecutor,
    shutdown: watch::Receiver<bool>,
}

impl ExamCoordinator {
    /// Creates a coordinator talking to Google Drive and Sheets
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP clients cannot be built
    pub fn new(config: ExamGenConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let drive = DriveClient::new(&config.google, config.sharing.send_notification_email)?;
        let sheets = Arc::new(SheetsClient::new(&config.google)?);
        Ok(Self::with_services(
            config,
            Arc::new(drive),
            sheets.clone(),
            sheets,
            shutdown,
        ))
    }

    /// Creates a coordinator over explicit service implementations
    pub fn with_services(
        config: ExamGenConfig,
        store: Arc<dyn DocumentStore>,
        roster: Arc<dyn RosterSource>,
        ledger: Arc<dyn LedgerSink>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let retry = RetryExecutor::new(RetryPolicy::from_config(&config.retry));
        Self {
            config,
            store,
            roster,
            ledger,
            retry,
            shutdown,
        }
    }

    fn locator(&self) -> ExamLocator {
        ExamLocator::new(
            self.store.clone(),
            self.retry.clone(),
            &self.config.exam,
            &self.config.roster,
        )
    }

    fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn load_students(
        &self,
        locator: &ExamLocator,
        exam_folder: &FileId,
        filter: &StudentFilter,
    ) -> Result<Vec<Student>> {
        let class_list = locator.find_class_list(exam_folder).await?;
        let students = load_roster(
            self.roster.as_ref(),
            &self.retry,
            &class_list,
            &self.config.roster,
        )
        .await?;
        let selected = filter.apply(students);
        if selected.is_empty() {
            tracing::warn!("No students selected");
        }
        Ok(selected)
    }

    /// Draws a variant set per student, records it, and builds the workspaces
    ///
    /// A student whose workspace already exists keeps the variants it holds;
    /// only questions with nothing in the workspace are drawn, so re-running
    /// after a partial failure completes workspaces instead of mixing in a
    /// second draw. A workspace holding two variants of one question is
    /// reported as a failure and left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error when the exam folder, question bank or class list
    /// cannot be loaded, or the ledger cannot be written. No workspace is
    /// created in those cases.
    pub async fn generate(&self, folder: &str, filter: &StudentFilter) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::new("generate", folder);
        tracing::info!(folder = %folder, "Generating exams");

        let locator = self.locator();
        let exam_folder = locator.find_exam_folder(folder).await?;
        let exam = locator.load_exam(&exam_folder.id).await?;
        let students = self.load_students(&locator, &exam_folder.id, filter).await?;
        summary.students = students.len();

        let assembler = ExamAssembler::new(
            self.store.clone(),
            self.retry.clone(),
            self.config.exam.parallel_students,
        );
        let existing_root = locator
            .find_child_folder(&exam_folder.id, &self.config.exam.exams_root_name)
            .await?;

        let mut jobs: Vec<(Student, VariantAssignment)> = Vec::with_capacity(students.len());
        for student in students {
            let present = match &existing_root {
                Some(root) => match assembler.workspace_contents(root, &student).await {
                    Ok(present) => present,
                    Err(e) => {
                        crate::log_error_with_context!(&e, student.display_name().as_str());
                        summary.add_failure(student.display_name(), FailureStage::Workspace, &e);
                        continue;
                    }
                },
                None => HashSet::new(),
            };

            let drawn =
                exam.resume_variant_set(student.id.clone(), &present, &mut rand::thread_rng());
            match drawn {
                Ok(assignment) => {
                    tracing::info!(
                        assignment = %assignment,
                        workspace_items = present.len(),
                        "Drew variants"
                    );
                    jobs.push((student, assignment));
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, student.display_name().as_str());
                    summary.add_failure(student.display_name(), FailureStage::Workspace, &e);
                }
            }
        }

        if jobs.is_empty() {
            return Ok(summary.with_duration(start.elapsed()));
        }

        let title = ledger_title(&self.config.exam.ledger_title, folder, chrono::Utc::now());
        let ledger = VariantLedger::create(
            self.ledger.clone(),
            self.retry.clone(),
            &title,
            &exam.question_names(),
        )
        .await?;
        ledger.record(&jobs).await?;
        summary.ledger_url = Some(ledger.url());

        if self.is_shutting_down() {
            summary.interrupted = true;
            return Ok(summary.with_duration(start.elapsed()));
        }

        let exams_root = match existing_root {
            Some(root) => root,
            None => {
                assembler
                    .ensure_folder(&exam_folder.id, &self.config.exam.exams_root_name)
                    .await?
            }
        };

        for (student, result) in assembler.assemble_all(&exams_root, jobs).await {
            match result {
                Ok(outcome) if outcome.copied == 0 => summary.skipped += 1,
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    crate::log_error_with_context!(&e, student.display_name().as_str());
                    summary.add_failure(student.display_name(), FailureStage::Assembly, &e);
                }
            }
        }

        Ok(summary.with_duration(start.elapsed()))
    }

    /// Resolves each selected student's workspace
    ///
    /// Students without a workspace are recorded as failures.
    async fn share_targets(
        &self,
        folder: &str,
        filter: &StudentFilter,
        summary: &mut RunSummary,
    ) -> Result<Vec<ShareTarget>> {
        let locator = self.locator();
        let exam_folder = locator.find_exam_folder(folder).await?;
        let students = self.load_students(&locator, &exam_folder.id, filter).await?;
        summary.students = students.len();

        let exams_root = locator
            .find_child_folder(&exam_folder.id, &self.config.exam.exams_root_name)
            .await?
            .ok_or_else(|| {
                ExamGenError::NotFound(format!(
                    "'{}' has no '{}' folder; run `examgen generate {folder}` first",
                    folder, self.config.exam.exams_root_name
                ))
            })?;

        let mut targets = Vec::with_capacity(students.len());
        for student in students {
            match locator
                .find_child_folder(&exams_root, &student.display_name())
                .await
            {
                Ok(Some(workspace)) => targets.push(ShareTarget { student, workspace }),
                Ok(None) => summary.add_failure(
                    student.display_name(),
                    FailureStage::Workspace,
                    &ExamGenError::NotFound("workspace folder does not exist".to_string()),
                ),
                Err(e) => summary.add_failure(student.display_name(), FailureStage::Workspace, &e),
            }
        }
        Ok(targets)
    }

    fn scheduler(&self) -> AccessScheduler {
        AccessScheduler::new(
            self.store.clone(),
            self.retry.clone(),
            self.config.sharing.role.clone(),
            self.config.sharing.override_policy,
            Duration::from_secs(self.config.sharing.tick_seconds),
        )
    }

    /// Shares every workspace now and revokes each at its deadline
    ///
    /// Returns once every timed share is revoked, or at shutdown. Indefinite
    /// shares are left in place.
    pub async fn share(
        &self,
        folder: &str,
        filter: &StudentFilter,
        minutes: Option<Minutes>,
    ) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::new("share", folder);
        tracing::info!(folder = %folder, minutes = ?minutes.map(Minutes::get), "Sharing exams");

        let targets = self.share_targets(folder, filter, &mut summary).await?;
        let names: HashMap<StudentId, String> = targets
            .iter()
            .map(|t| (t.student.id.clone(), t.student.display_name()))
            .collect();
        let name_of = |id: &StudentId| names.get(id).cloned().unwrap_or_else(|| id.to_string());

        let scheduler = self.scheduler();
        let grant = scheduler.start_sharing(targets, minutes).await;
        summary.skipped += grant.already_active.len();
        for (id, e) in &grant.failures {
            summary.add_failure(name_of(id), FailureStage::Grant, e);
        }
        tracing::info!(
            granted = grant.granted.len(),
            timed = grant.timed,
            "Access granted"
        );

        let clock = scheduler.run_clock(self.shutdown.clone()).await;
        for (id, e) in &clock.revoke.failures {
            summary.add_failure(name_of(id), FailureStage::Revoke, e);
        }

        let failed_revokes = clock.revoke.failures.len();
        summary.succeeded = grant.granted.len().saturating_sub(failed_revokes);
        summary.interrupted = clock.interrupted;
        summary.still_shared = scheduler.status().await.active;

        Ok(summary.with_duration(start.elapsed()))
    }

    /// Revokes the selected students' access now
    pub async fn unshare(&self, folder: &str, filter: &StudentFilter) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::new("unshare", folder);
        tracing::info!(folder = %folder, "Revoking access");

        let targets = self.share_targets(folder, filter, &mut summary).await?;
        let names: HashMap<StudentId, String> = targets
            .iter()
            .map(|t| (t.student.id.clone(), t.student.display_name()))
            .collect();

        let outcome = self.scheduler().stop_sharing(&targets).await;
        summary.succeeded = outcome.revoked.len();
        summary.skipped = outcome.already_expired.len();
        for (id, e) in &outcome.failures {
            let name = names.get(id).cloned().unwrap_or_else(|| id.to_string());
            summary.add_failure(name, FailureStage::Revoke, e);
        }
        summary.still_shared = outcome.failures.len();

        Ok(summary.with_duration(start.elapsed()))
    }
}
