//! Class roster parsing
//!
//! Turns the rows of the class list spreadsheet into [`Student`]s. Overrides
//! are parsed here, once, so the rest of the crate only sees `Option<Minutes>`.

use crate::adapters::store::RosterSource;
use crate::config::RosterConfig;
use crate::core::retry::RetryExecutor;
use crate::domain::ids::{FileId, StudentId};
use crate::domain::{ExamGenError, Minutes, Result, Student};
use std::collections::HashSet;

/// Reads and parses the roster spreadsheet
///
/// # Errors
///
/// Propagates the remote error once retries are exhausted, or a `Validation`
/// error from [`parse_roster`]
pub async fn load_roster(
    source: &dyn RosterSource,
    retry: &RetryExecutor,
    sheet: &FileId,
    config: &RosterConfig,
) -> Result<Vec<Student>> {
    let rows = retry
        .run("read class list", || source.read_range(sheet, &config.range))
        .await?;
    let students = parse_roster(&rows, config)?;

    tracing::info!(
        sheet = %sheet,
        students = students.len(),
        overrides = students.iter().filter(|s| s.override_duration.is_some()).count(),
        "Loaded class list"
    );
    Ok(students)
}

/// Parses roster rows
///
/// The first `header_rows` rows are skipped, as are rows whose cells are all
/// blank. Row numbers in error messages are 1-based spreadsheet rows.
///
/// # Errors
///
/// Returns `Validation` for a row missing a required column, an empty id, an
/// unparseable override, or a display name or id that occurs twice
pub fn parse_roster(rows: &[Vec<String>], config: &RosterConfig) -> Result<Vec<Student>> {
    let width = config.required_width();
    let mut students = Vec::new();
    let mut names = HashSet::new();
    let mut ids = HashSet::new();

    for (index, row) in rows.iter().enumerate().skip(config.header_rows) {
        let row_number = index + 1;

        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        if row.len() < width {
            return Err(ExamGenError::Validation(format!(
                "Class list row {row_number} has {} cells; at least {width} are required",
                row.len()
            )));
        }

        let cell = |column: usize| row[column].trim();

        let id = StudentId::new(cell(config.id_column))
            .map_err(|e| ExamGenError::Validation(format!("Class list row {row_number}: {e}")))?;

        let email = cell(config.email_column);
        if email.is_empty() {
            return Err(ExamGenError::Validation(format!(
                "Class list row {row_number}: student {id} has no email address"
            )));
        }

        let mut student = Student::new(
            id,
            cell(config.last_name_column),
            cell(config.first_name_column),
            email,
        );

        if let Some(raw) = config
            .override_column
            .and_then(|column| row.get(column))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
        {
            let minutes: Minutes = raw.parse().map_err(|e| {
                ExamGenError::Validation(format!(
                    "Class list row {row_number}: invalid override duration: {e}"
                ))
            })?;
            student = student.with_override(minutes);
        }

        if !ids.insert(student.id.clone()) {
            return Err(ExamGenError::Validation(format!(
                "Class list row {row_number}: student id {} appears more than once",
                student.id
            )));
        }
        if !names.insert(student.display_name()) {
            return Err(ExamGenError::Validation(format!(
                "Class list row {row_number}: workspace name '{}' is not unique",
                student.display_name()
            )));
        }

        students.push(student);
    }

    Ok(students)
}
