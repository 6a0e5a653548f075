//! Student subset selection (`--only` / `--except`)

use crate::domain::ids::StudentId;
use crate::domain::{ExamGenError, Result, Student};
use std::collections::HashSet;

/// Which roster students a command applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StudentFilter {
    /// Every student on the roster
    #[default]
    All,
    /// Only the listed students
    Only(Vec<StudentId>),
    /// Everyone but the listed students
    Except(Vec<StudentId>),
}

impl StudentFilter {
    /// Builds a filter from the two optional id lists
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when both lists are given
    pub fn from_lists(only: Vec<StudentId>, except: Vec<StudentId>) -> Result<Self> {
        match (only.is_empty(), except.is_empty()) {
            (true, true) => Ok(StudentFilter::All),
            (false, true) => Ok(StudentFilter::Only(only)),
            (true, false) => Ok(StudentFilter::Except(except)),
            (false, false) => Err(ExamGenError::InvalidArgument(
                "--only and --except cannot be combined".to_string(),
            )),
        }
    }

    /// Applies the filter, keeping roster order
    ///
    /// Ids that match no roster entry are logged and otherwise ignored.
    pub fn apply(&self, students: Vec<Student>) -> Vec<Student> {
        let (ids, keep_listed) = match self {
            StudentFilter::All => return students,
            StudentFilter::Only(ids) => (ids, true),
            StudentFilter::Except(ids) => (ids, false),
        };

        let wanted: HashSet<&StudentId> = ids.iter().collect();
        let known: HashSet<&StudentId> = students.iter().map(|s| &s.id).collect();
        for id in wanted.difference(&known) {
            tracing::warn!(student_id = %id, "Student id not found in class list");
        }

        students
            .into_iter()
            .filter(|s| wanted.contains(&s.id) == keep_listed)
            .collect()
    }
}
