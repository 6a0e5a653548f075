//! Finds the exam folder, its question bank and its class list

use crate::adapters::store::{DocumentStore, DriveItem, DriveQuery, FOLDER_MIME_TYPE};
use crate::config::{ExamConfig, RosterConfig};
use crate::core::retry::RetryExecutor;
use crate::domain::ids::FileId;
use crate::domain::{Exam, ExamGenError, Question, Result, Variant};
use std::sync::Arc;

/// Read-only lookups against the document store
///
/// Every remote read goes through the retry executor.
pub struct ExamLocator {
    store: Arc<dyn DocumentStore>,
    retry: RetryExecutor,
    exam: ExamConfig,
    class_list_name: String,
}

impl ExamLocator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        retry: RetryExecutor,
        exam: &ExamConfig,
        roster: &RosterConfig,
    ) -> Self {
        Self {
            store,
            retry,
            exam: exam.clone(),
            class_list_name: roster.class_list_name.clone(),
        }
    }

    async fn list(&self, operation: &str, query: DriveQuery) -> Result<Vec<DriveItem>> {
        self.retry
            .run(operation, || self.store.list(&query))
            .await
    }

    /// Finds the exam folder by exact name
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no folder has that name
    pub async fn find_exam_folder(&self, name: &str) -> Result<DriveItem> {
        let mut matches = self
            .list(
                "find exam folder",
                DriveQuery::new().named(name).of_type(FOLDER_MIME_TYPE),
            )
            .await?;

        if matches.len() > 1 {
            tracing::warn!(
                folder = %name,
                count = matches.len(),
                "Several folders share the exam name; using the first"
            );
        }

        if matches.is_empty() {
            return Err(ExamGenError::NotFound(format!(
                "No folder named '{name}' is visible to this account. Check the name \
                 and that the folder is shared with the account running examgen"
            )));
        }
        Ok(matches.swap_remove(0))
    }

    /// Builds the question bank of an exam folder
    ///
    /// Question folders are the sub-folders whose name contains the configured
    /// prefix, ordered by name. Each non-folder child is one variant.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an exam with no question folders, a question
    /// folder with no variants, or variant names repeated across questions
    pub async fn load_exam(&self, exam_folder: &FileId) -> Result<Exam> {
        let mut folders: Vec<DriveItem> = self
            .list(
                "list question folders",
                DriveQuery::new()
                    .in_folder(exam_folder)
                    .name_contains(self.exam.question_folder_prefix.clone())
                    .of_type(FOLDER_MIME_TYPE),
            )
            .await?
            .into_iter()
            .filter(|f| f.name != self.exam.exams_root_name)
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));

        let mut questions = Vec::with_capacity(folders.len());
        for folder in folders {
            let mut files: Vec<DriveItem> = self
                .list("list question variants", DriveQuery::new().in_folder(&folder.id))
                .await?
                .into_iter()
                .filter(|f| !f.is_folder())
                .collect();
            files.sort_by(|a, b| a.name.cmp(&b.name));

            let variants = files
                .into_iter()
                .map(|f| Variant::new(f.name, f.id))
                .collect();
            let question = Question::new(folder.name, variants)?;
            tracing::debug!(
                question = %question.name(),
                variants = question.variants().len(),
                "Loaded question"
            );
            questions.push(question);
        }

        let exam = Exam::new(questions)?;
        tracing::info!(
            questions = exam.question_count(),
            "Loaded question bank"
        );
        Ok(exam)
    }

    /// Finds the class list spreadsheet inside the exam folder
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the exam folder has no class list
    pub async fn find_class_list(&self, exam_folder: &FileId) -> Result<FileId> {
        let matches = self
            .list(
                "find class list",
                DriveQuery::new()
                    .named(self.class_list_name.clone())
                    .in_folder(exam_folder),
            )
            .await?;

        matches
            .into_iter()
            .find(|item| !item.is_folder())
            .map(|item| item.id)
            .ok_or_else(|| {
                ExamGenError::NotFound(format!(
                    "No '{}' spreadsheet in the exam folder. Add the class roster \
                     under that name",
                    self.class_list_name
                ))
            })
    }

    /// Finds a sub-folder by exact name
    pub async fn find_child_folder(&self, parent: &FileId, name: &str) -> Result<Option<FileId>> {
        let matches = self
            .list(
                "find folder",
                DriveQuery::new()
                    .named(name)
                    .in_folder(parent)
                    .of_type(FOLDER_MIME_TYPE),
            )
            .await?;
        Ok(matches.into_iter().next().map(|item| item.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::memory::InMemoryStore;
    use crate::adapters::store::SPREADSHEET_MIME_TYPE;

    fn locator(store: Arc<InMemoryStore>) -> ExamLocator {
        ExamLocator::new(
            store,
            RetryExecutor::default(),
            &ExamConfig::default(),
            &RosterConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_load_exam_orders_questions_by_name() {
        let store = Arc::new(InMemoryStore::new());
        let exam = store.add_folder("Midterm", None);
        let q2 = store.add_folder("Q2", Some(&exam));
        let q1 = store.add_folder("Q1", Some(&exam));
        store.add_folder("Student Exams", Some(&exam));
        store.add_folder("Notes", Some(&exam));
        store.add_item("Q1b", Some(&q1), "application/pdf");
        store.add_item("Q1a", Some(&q1), "application/pdf");
        store.add_item("Q2a", Some(&q2), "application/pdf");

        let bank = locator(store).load_exam(&exam).await.unwrap();

        assert_eq!(bank.question_names(), vec!["Q1", "Q2"]);
        let q1_variants: Vec<&str> = bank.questions()[0]
            .variants()
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(q1_variants, vec!["Q1a", "Q1b"]);
    }

    #[tokio::test]
    async fn test_load_exam_rejects_empty_question() {
        let store = Arc::new(InMemoryStore::new());
        let exam = store.add_folder("Midterm", None);
        store.add_folder("Q1", Some(&exam));

        let err = locator(store).load_exam(&exam).await.unwrap_err();
        assert!(matches!(err, ExamGenError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_missing_exam_folder_is_not_found() {
        let store = Arc::new(InMemoryStore::new());

        let err = locator(store).find_exam_folder("Final").await.unwrap_err();
        assert!(matches!(err, ExamGenError::NotFound(_)));
        assert!(err.to_string().contains("Final"));
    }

    #[tokio::test]
    async fn test_find_class_list() {
        let store = Arc::new(InMemoryStore::new());
        let exam = store.add_folder("Midterm", None);
        let sheet = store.add_item("ClassList", Some(&exam), SPREADSHEET_MIME_TYPE);

        let found = locator(store.clone()).find_class_list(&exam).await.unwrap();
        assert_eq!(found, sheet);

        let other = store.add_folder("Other", None);
        let err = locator(store).find_class_list(&other).await.unwrap_err();
        assert!(matches!(err, ExamGenError::NotFound(_)));
    }
}
