//! Variant ledger: the audit record of which variant each student received

use crate::adapters::store::LedgerSink;
use crate::core::retry::RetryExecutor;
use crate::domain::ids::FileId;
use crate::domain::{Result, Student, VariantAssignment};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Spreadsheet title for one generate run
pub fn ledger_title(prefix: &str, exam_name: &str, at: DateTime<Utc>) -> String {
    format!("{prefix} - {exam_name} - {}", at.format("%Y-%m-%d %H:%M:%S UTC"))
}

/// Header row: `Student`, then one column per question
pub fn header_row(question_names: &[String]) -> Vec<String> {
    std::iter::once("Student".to_string())
        .chain(question_names.iter().cloned())
        .collect()
}

/// Ledger row: the student's display name, then the chosen variant per question
pub fn ledger_row(student: &Student, assignment: &VariantAssignment) -> Vec<String> {
    std::iter::once(student.display_name())
        .chain(assignment.variant_names())
        .collect()
}

/// One ledger spreadsheet
pub struct VariantLedger {
    sink: Arc<dyn LedgerSink>,
    retry: RetryExecutor,
    sheet: FileId,
}

impl VariantLedger {
    /// Creates the spreadsheet and writes the header row
    pub async fn create(
        sink: Arc<dyn LedgerSink>,
        retry: RetryExecutor,
        title: &str,
        question_names: &[String],
    ) -> Result<Self> {
        let sheet = retry
            .run("create ledger", || sink.create_sheet(title))
            .await?;
        let ledger = Self { sink, retry, sheet };
        ledger.append(vec![header_row(question_names)]).await?;

        tracing::info!(
            sheet = %ledger.sheet,
            url = %ledger.url(),
            title = %title,
            "Created variant ledger"
        );
        Ok(ledger)
    }

    pub fn sheet(&self) -> &FileId {
        &self.sheet
    }

    /// Browser link to the spreadsheet
    pub fn url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.sheet)
    }

    /// Appends one row per assignment in a single call
    pub async fn record(&self, assignments: &[(Student, VariantAssignment)]) -> Result<()> {
        if assignments.is_empty() {
            return Ok(());
        }
        let rows = assignments
            .iter()
            .map(|(student, assignment)| ledger_row(student, assignment))
            .collect();
        self.append(rows).await?;
        tracing::debug!(rows = assignments.len(), "Recorded assignments in ledger");
        Ok(())
    }

    async fn append(&self, rows: Vec<Vec<String>>) -> Result<()> {
        self.retry
            .run("append ledger rows", || {
                self.sink.append_rows(&self.sheet, rows.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::memory::InMemoryStore;
    use crate::domain::ids::StudentId;
    use crate::domain::{AssignedVariant, Variant};
    use chrono::TimeZone;

    fn assignment(student: &Student, names: &[&str]) -> VariantAssignment {
        VariantAssignment {
            student: student.id.clone(),
            picks: names
                .iter()
                .enumerate()
                .map(|(i, n)| AssignedVariant {
                    question: format!("Q{}", i + 1),
                    variant: Variant::new(*n, FileId::new(format!("id-{n}")).unwrap()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_ledger_title_includes_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 5, 0).unwrap();
        assert_eq!(
            ledger_title("Variant Ledger", "Midterm", at),
            "Variant Ledger - Midterm - 2025-03-14 09:05:00 UTC"
        );
    }

    #[test]
    fn test_ledger_row_layout() {
        let student = Student::new(StudentId::new("7").unwrap(), "Doe", "Jo", "jo@x.edu");
        let row = ledger_row(&student, &assignment(&student, &["Q1b", "Q2a"]));
        assert_eq!(row, vec!["Doe_Jo_7", "Q1b", "Q2a"]);
    }

    #[tokio::test]
    async fn test_create_and_record() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = VariantLedger::create(
            store.clone(),
            RetryExecutor::default(),
            "Ledger",
            &["Q1".to_string(), "Q2".to_string()],
        )
        .await
        .unwrap();

        let a = Student::new(StudentId::new("1").unwrap(), "A", "Al", "a@x.edu");
        let b = Student::new(StudentId::new("2").unwrap(), "B", "Bo", "b@x.edu");
        let rows = vec![
            (a.clone(), assignment(&a, &["Q1a", "Q2b"])),
            (b.clone(), assignment(&b, &["Q1b", "Q2b"])),
        ];
        ledger.record(&rows).await.unwrap();

        let sheets = store.ledger_rows();
        assert_eq!(sheets.len(), 1);
        let (title, written) = &sheets[0];
        assert_eq!(title, "Ledger");
        assert_eq!(written.len(), 3);
        assert_eq!(written[0], vec!["Student", "Q1", "Q2"]);
        assert_eq!(written[2], vec!["B_Bo_2", "Q1b", "Q2b"]);
        assert!(ledger.url().ends_with(ledger.sheet().as_str()));
    }
}
