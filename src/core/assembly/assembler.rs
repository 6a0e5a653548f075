//! Materialises a student's variant assignment into a workspace folder
//!
//! Assembly is best-effort and re-runnable: artifacts already present in the
//! workspace (matched by name) are skipped, so a second run only fills gaps.

use crate::adapters::store::{DocumentStore, DriveQuery, FOLDER_MIME_TYPE};
use crate::core::retry::RetryExecutor;
use crate::domain::ids::FileId;
use crate::domain::{Result, Student, Variant, VariantAssignment};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

/// Result of assembling one workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOutcome {
    pub workspace: FileId,
    pub copied: usize,
    pub already_present: usize,
}

/// Builds student workspaces
#[derive(Clone)]
pub struct ExamAssembler {
    store: Arc<dyn DocumentStore>,
    retry: RetryExecutor,
    parallel_students: usize,
}

impl ExamAssembler {
    pub fn new(store: Arc<dyn DocumentStore>, retry: RetryExecutor, parallel_students: usize) -> Self {
        Self {
            store,
            retry,
            parallel_students: parallel_students.max(1),
        }
    }

    async fn find_folder(&self, parent: &FileId, name: &str) -> Result<Option<FileId>> {
        let query = DriveQuery::new()
            .named(name)
            .in_folder(parent)
            .of_type(FOLDER_MIME_TYPE);
        let existing = self
            .retry
            .run("find folder", || self.store.list(&query))
            .await?;
        Ok(existing.into_iter().next().map(|folder| folder.id))
    }

    async fn contents(&self, workspace: &FileId) -> Result<HashSet<String>> {
        let query = DriveQuery::new().in_folder(workspace);
        Ok(self
            .retry
            .run("list workspace", || self.store.list(&query))
            .await?
            .into_iter()
            .map(|item| item.name)
            .collect())
    }

    /// Returns the id of folder `name` under `parent`, creating it if missing
    pub async fn ensure_folder(&self, parent: &FileId, name: &str) -> Result<FileId> {
        if let Some(id) = self.find_folder(parent, name).await? {
            tracing::debug!(name = %name, id = %id, "Reusing folder");
            return Ok(id);
        }

        let id = self
            .retry
            .run("create folder", || self.store.create_folder(name, parent))
            .await?;
        tracing::info!(name = %name, id = %id, "Created folder");
        Ok(id)
    }

    /// Names of the artifacts already in a student's workspace
    ///
    /// Returns an empty set when the workspace does not exist yet.
    pub async fn workspace_contents(
        &self,
        exams_root: &FileId,
        student: &Student,
    ) -> Result<HashSet<String>> {
        match self.find_folder(exams_root, &student.display_name()).await? {
            Some(workspace) => self.contents(&workspace).await,
            None => Ok(HashSet::new()),
        }
    }

    /// Copies one variant into the workspace
    ///
    /// A copy that lands outside the workspace is moved into place; if that
    /// move fails the stray copy is deleted so it is never mistaken for a
    /// variant of the question it sits next to.
    async fn place(&self, variant: &Variant, workspace: &FileId) -> Result<()> {
        let copy = self
            .retry
            .run("copy variant", || {
                self.store.copy(&variant.artifact, &variant.name, workspace)
            })
            .await?;
        if copy.parents.contains(workspace) {
            return Ok(());
        }

        let moved = self
            .retry
            .run("move variant", || {
                self.store.move_file(&copy.id, &copy.parents, workspace)
            })
            .await;
        if let Err(e) = moved {
            let cleanup = self
                .retry
                .run("delete stray copy", || self.store.delete_file(&copy.id))
                .await;
            if let Err(cleanup_err) = cleanup {
                tracing::error!(
                    copy = %copy.id,
                    name = %variant.name,
                    error = %cleanup_err,
                    "Stray copy could not be deleted; remove it by hand"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Assembles one student's workspace under `exams_root`
    ///
    /// # Errors
    ///
    /// Returns the first copy or move that exhausted its retries; the workspace
    /// may then be partially populated and a re-run completes it.
    pub async fn assemble(
        &self,
        exams_root: &FileId,
        student: &Student,
        assignment: &VariantAssignment,
    ) -> Result<AssemblyOutcome> {
        let workspace = self.ensure_folder(exams_root, &student.display_name()).await?;

        let present = self.contents(&workspace).await?;

        let mut outcome = AssemblyOutcome {
            workspace: workspace.clone(),
            copied: 0,
            already_present: 0,
        };

        for pick in &assignment.picks {
            let variant = &pick.variant;
            if present.contains(&variant.name) {
                outcome.already_present += 1;
                continue;
            }

            self.place(variant, &workspace).await?;
            outcome.copied += 1;
        }

        tracing::info!(
            student = %student.display_name(),
            workspace = %workspace,
            copied = outcome.copied,
            already_present = outcome.already_present,
            "Assembled workspace"
        );
        Ok(outcome)
    }

    /// Assembles many workspaces concurrently
    ///
    /// Results come back in completion order; one student's failure does not
    /// stop the others.
    pub async fn assemble_all(
        &self,
        exams_root: &FileId,
        jobs: Vec<(Student, VariantAssignment)>,
    ) -> Vec<(Student, Result<AssemblyOutcome>)> {
        stream::iter(jobs)
            .map(|(student, assignment)| async move {
                let result = self.assemble(exams_root, &student, &assignment).await;
                if let Err(e) = &result {
                    tracing::error!(
                        student = %student.display_name(),
                        error = %e,
                        "Workspace assembly failed"
                    );
                }
                (student, result)
            })
            .buffer_unordered(self.parallel_students)
            .collect()
            .await
    }
}
