//! Domain identifier types with validation
//!
//! Newtype wrappers keep student identifiers, remote file ids and permission ids
//! from being mixed up. Each constructor rejects blank input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Student identifier as it appears in the class roster
///
/// # Examples
///
/// ```
/// use examgen::domain::ids::StudentId;
/// use std::str::FromStr;
///
/// let id = StudentId::from_str("A00123").unwrap();
/// assert_eq!(id.as_str(), "A00123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(String);

impl StudentId {
    /// Creates a new StudentId, trimming surrounding whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Student ID cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the student ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StudentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a file or folder in the remote document store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    /// Creates a new FileId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("File ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the file ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a sharing permission attached to a remote file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a new PermissionId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Permission ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the permission ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PermissionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_id_trims() {
        let id = StudentId::new("  A001 ").unwrap();
        assert_eq!(id.as_str(), "A001");
        assert_eq!(id.to_string(), "A001");
    }

    #[test]
    fn test_empty_ids_rejected() {
        assert!(StudentId::new("").is_err());
        assert!(StudentId::new("   ").is_err());
        assert!(FileId::new("").is_err());
        assert!(PermissionId::new(" ").is_err());
    }

    #[test]
    fn test_file_id_from_str() {
        let id = FileId::from_str("1AbCdEf").unwrap();
        assert_eq!(id.as_ref(), "1AbCdEf");
    }
}
