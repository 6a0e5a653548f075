//! Bulk mutation runner with per-item outcomes
//!
//! A batch is a set of independent mutations. One item failing never stops the
//! others; every item's outcome is returned in submission order and failures
//! are logged as well.

use crate::adapters::store::{DocumentStore, Mutation, MutationOutput};
use crate::domain::{ExamGenError, RemoteError, Result};
use crate::log_batch_outcome;
use std::sync::Arc;

/// Resolution of a single batch item
#[derive(Debug)]
pub enum ItemStatus {
    /// The mutation was applied
    Succeeded(MutationOutput),
    /// A delete found nothing to delete
    AlreadyAbsent,
    /// The mutation failed
    Failed(ExamGenError),
}

/// Outcome of one mutation, tagged with its position in the batch
#[derive(Debug)]
pub struct ItemOutcome {
    pub index: usize,
    pub mutation: Mutation,
    pub status: ItemStatus,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self.status, ItemStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&ExamGenError> {
        match &self.status {
            ItemStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-item results of one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_successful(&self) -> bool {
        self.failed() == 0
    }

    /// Returns the report, or `PartialBatchFailure` if any item failed
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed();
        if failed > 0 {
            return Err(ExamGenError::PartialBatchFailure {
                failed,
                total: self.total(),
            });
        }
        Ok(self)
    }
}

/// Submits mutations through [`DocumentStore::execute_batch`]
#[derive(Clone)]
pub struct BatchOperationRunner {
    store: Arc<dyn DocumentStore>,
}

impl BatchOperationRunner {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Runs one batch; `kind` names it in log output
    pub async fn run(&self, kind: &str, mutations: Vec<Mutation>) -> BatchReport {
        if mutations.is_empty() {
            return BatchReport::default();
        }

        let mut results = self
            .store
            .execute_batch(mutations.clone())
            .await
            .into_iter();

        let mut outcomes = Vec::with_capacity(mutations.len());
        for (index, mutation) in mutations.into_iter().enumerate() {
            let status = match results.next() {
                Some(Ok(output)) => ItemStatus::Succeeded(output),
                Some(Err(ExamGenError::Remote(RemoteError::NotFound(_)))) if mutation.is_delete() => {
                    tracing::debug!(item = %mutation, "Permission already absent");
                    ItemStatus::AlreadyAbsent
                }
                Some(Err(e)) => ItemStatus::Failed(e),
                None => ItemStatus::Failed(ExamGenError::Remote(RemoteError::InvalidResponse(
                    "batch returned no outcome for this item".to_string(),
                ))),
            };

            if let ItemStatus::Failed(e) = &status {
                tracing::warn!(kind = kind, index = index, item = %mutation, error = %e, "Batch item failed");
            }

            outcomes.push(ItemOutcome {
                index,
                mutation,
                status,
            });
        }

        let report = BatchReport { outcomes };
        log_batch_outcome!(kind, report.succeeded(), report.failed());
        report
    }
}
