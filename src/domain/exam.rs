//! Question bank and per-student variant selection
//!
//! An [`Exam`] is an ordered list of [`Question`]s, each holding one or more
//! interchangeable [`Variant`]s. The structure is immutable once built, so any
//! number of assignments can be drawn from it concurrently; every draw only reads
//! the bank and consumes randomness from the caller's generator.
//!
//! # Example
//!
//! ```
//! use examgen::domain::exam::{Exam, Question, Variant};
//! use examgen::domain::ids::{FileId, StudentId};
//! use rand::SeedableRng;
//!
//! # fn example() -> examgen::domain::Result<()> {
//! let q1 = Question::new("Q1", vec![
//!     Variant::new("Q1a.docx", FileId::new("f-1a").unwrap()),
//!     Variant::new("Q1b.docx", FileId::new("f-1b").unwrap()),
//! ])?;
//! let exam = Exam::new(vec![q1])?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let assignment = exam.generate_variant_set(StudentId::new("A1").unwrap(), &mut rng);
//! assert_eq!(assignment.len(), exam.question_count());
//! # Ok(())
//! # }
//! ```

use super::errors::ExamGenError;
use super::ids::{FileId, StudentId};
use super::result::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One concrete version of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Artifact name, reused as the file name inside a workspace
    pub name: String,

    /// Remote artifact to copy
    pub artifact: FileId,
}

impl Variant {
    /// Creates a new variant
    pub fn new(name: impl Into<String>, artifact: FileId) -> Self {
        Self {
            name: name.into(),
            artifact,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A question and its interchangeable variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    name: String,
    variants: Vec<Variant>,
}

impl Question {
    /// Creates a question
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `variants` is empty: a question that cannot
    /// produce a variant is a broken bank, reported before any exam is generated.
    pub fn new(name: impl Into<String>, variants: Vec<Variant>) -> Result<Self> {
        let name = name.into();
        if variants.is_empty() {
            return Err(ExamGenError::Configuration(format!(
                "Question '{name}' has no variants; add at least one file to its folder"
            )));
        }
        Ok(Self { name, variants })
    }

    /// Question (folder) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All variants of this question
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Picks one variant uniformly at random
    ///
    /// Every call is an independent draw; nothing is remembered between students.
    pub fn pick_variant<R: Rng + ?Sized>(&self, rng: &mut R) -> &Variant {
        // `new` guarantees at least one variant
        self.variants
            .choose(rng)
            .unwrap_or(&self.variants[0])
    }
}

/// The full question bank in question-folder order
#[derive(Debug, Clone)]
pub struct Exam {
    questions: Vec<Question>,
}

impl Exam {
    /// Creates an exam from questions already sorted in presentation order
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when there are no questions, or when two
    /// questions contain a variant with the same name (workspace artifacts are
    /// identified by name, so such variants would overwrite each other).
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(ExamGenError::Configuration(
                "Exam has no questions".to_string(),
            ));
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for question in &questions {
            for variant in question.variants() {
                if let Some(other) = seen.insert(variant.name.as_str(), question.name()) {
                    if other != question.name() {
                        return Err(ExamGenError::Configuration(format!(
                            "Variant name '{}' appears in both '{}' and '{}'; rename one of them",
                            variant.name,
                            other,
                            question.name()
                        )));
                    }
                }
            }
        }

        Ok(Self { questions })
    }

    /// Questions in order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Question names in order, used as ledger column headers
    pub fn question_names(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.name.clone()).collect()
    }

    /// Draws one variant per question for a student
    pub fn generate_variant_set<R: Rng + ?Sized>(
        &self,
        student: StudentId,
        rng: &mut R,
    ) -> VariantAssignment {
        let picks = self
            .questions
            .iter()
            .map(|question| AssignedVariant {
                question: question.name.clone(),
                variant: question.pick_variant(rng).clone(),
            })
            .collect();

        VariantAssignment { student, picks }
    }

    /// Draws a variant set using the thread-local generator
    pub fn generate_random_variant_set(&self, student: StudentId) -> VariantAssignment {
        self.generate_variant_set(student, &mut rand::thread_rng())
    }

    /// Draws a variant set that keeps the variants a workspace already holds
    ///
    /// `present` is the set of artifact names found in the student's
    /// workspace. A question with one of its variants present keeps it; only
    /// questions with none present are drawn. Names matching no variant are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when `present` holds more than one variant of the
    /// same question
    pub fn resume_variant_set<R: Rng + ?Sized>(
        &self,
        student: StudentId,
        present: &HashSet<String>,
        rng: &mut R,
    ) -> Result<VariantAssignment> {
        let mut picks = Vec::with_capacity(self.questions.len());
        for question in &self.questions {
            let held: Vec<&Variant> = question
                .variants
                .iter()
                .filter(|v| present.contains(&v.name))
                .collect();

            let variant = match held.as_slice() {
                [] => question.pick_variant(rng),
                [one] => *one,
                many => {
                    let names: Vec<&str> = many.iter().map(|v| v.name.as_str()).collect();
                    return Err(ExamGenError::Validation(format!(
                        "Workspace of {student} holds several variants of '{}' ({}); \
                         remove all but one and re-run",
                        question.name,
                        names.join(", ")
                    )));
                }
            };
            picks.push(AssignedVariant {
                question: question.name.clone(),
                variant: variant.clone(),
            });
        }

        Ok(VariantAssignment { student, picks })
    }
}

/// One question's pick inside an assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedVariant {
    /// Question the variant answers
    pub question: String,

    /// The chosen variant
    pub variant: Variant,
}

/// The variants chosen for one student, in exam question order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAssignment {
    /// Student the assignment belongs to
    pub student: StudentId,

    /// One pick per question
    pub picks: Vec<AssignedVariant>,
}

impl VariantAssignment {
    /// Number of picks (always the exam's question count)
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// True when the exam had no questions (never, for a valid exam)
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Chosen variant names, in question order
    pub fn variant_names(&self) -> Vec<String> {
        self.picks.iter().map(|p| p.variant.name.clone()).collect()
    }
}

impl fmt::Display for VariantAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}]", self.student, self.variant_names().join(", "))
    }
}
