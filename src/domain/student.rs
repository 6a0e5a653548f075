//! Student domain model
//!
//! A [`Student`] is loaded once from the class roster and never changes afterwards.

use super::ids::StudentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A whole number of minutes of access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Minutes(u32);

impl Minutes {
    /// Creates a new minute count
    pub fn new(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Returns the raw minute count
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl FromStr for Minutes {
    type Err = String;

    /// Parses a roster cell such as `"90"` or `"90.0"` (spreadsheets often
    /// render whole numbers with a trailing fraction)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u32>() {
            return Ok(Self(value));
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 => {
                Ok(Self(value as u32))
            }
            _ => Err(format!(
                "'{trimmed}' is not a whole, non-negative number of minutes"
            )),
        }
    }
}

/// A student enrolled in the class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Roster identifier
    pub id: StudentId,

    /// Family name
    pub last_name: String,

    /// Given name
    pub first_name: String,

    /// Account that receives access to the workspace
    pub email: String,

    /// Individual access window replacing the default duration
    pub override_duration: Option<Minutes>,
}

impl Student {
    /// Creates a student without an override duration
    pub fn new(
        id: StudentId,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            email: email.into(),
            override_duration: None,
        }
    }

    /// Sets the individual override duration
    pub fn with_override(mut self, minutes: Minutes) -> Self {
        self.override_duration = Some(minutes);
        self
    }

    /// Display identity `lastname_firstname_id`, used as the workspace folder name
    pub fn display_name(&self) -> String {
        format!("{}_{}_{}", self.last_name, self.first_name, self.id)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
