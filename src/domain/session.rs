//! Per-student sharing session
//!
//! A [`ShareSession`] exists from the moment a student's access is granted. Its
//! status only ever moves forward: `Active` to `Expired`, exactly once.

use super::ids::{FileId, PermissionId};
use super::student::{Minutes, Student};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a sharing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Access is granted
    Active,
    /// Access has been revoked (terminal)
    Expired,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Access-grant record for one student
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSession {
    /// Student holding the grant
    pub student: Student,

    /// Workspace folder shared with the student
    pub workspace: FileId,

    /// Elapsed minute at which access is revoked; `None` means indefinite
    pub deadline: Option<Minutes>,

    /// Permissions created by the grant, deleted on revoke
    pub permission_ids: Vec<PermissionId>,

    status: SessionStatus,
}

impl ShareSession {
    /// Creates an active session
    pub fn new(
        student: Student,
        workspace: FileId,
        deadline: Option<Minutes>,
        permission_ids: Vec<PermissionId>,
    ) -> Self {
        Self {
            student,
            workspace,
            deadline,
            permission_ids,
            status: SessionStatus::Active,
        }
    }

    /// Current status
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// True while access is granted
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// True when the session is active and will be revoked by the clock
    pub fn awaits_deadline(&self) -> bool {
        self.is_active() && self.deadline.is_some()
    }

    /// Moves the session to `Expired`
    ///
    /// Returns `true` only for the call that performed the transition; expiring an
    /// already expired session is a no-op returning `false`.
    pub fn expire(&mut self) -> bool {
        if self.status == SessionStatus::Expired {
            return false;
        }
        self.status = SessionStatus::Expired;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::StudentId;

    fn session(deadline: Option<u32>) -> ShareSession {
        let student = Student::new(StudentId::new("1").unwrap(), "Doe", "Jo", "jo@x.edu");
        ShareSession::new(
            student,
            FileId::new("ws-1").unwrap(),
            deadline.map(Minutes::new),
            vec![PermissionId::new("p-1").unwrap()],
        )
    }

    #[test]
    fn test_new_session_is_active() {
        let s = session(Some(10));
        assert_eq!(s.status(), SessionStatus::Active);
        assert!(s.awaits_deadline());
    }

    #[test]
    fn test_indefinite_session_never_awaits_deadline() {
        let s = session(None);
        assert!(s.is_active());
        assert!(!s.awaits_deadline());
    }

    #[test]
    fn test_expire_transitions_once() {
        let mut s = session(Some(5));
        assert!(s.expire());
        assert_eq!(s.status(), SessionStatus::Expired);
        assert!(!s.expire());
        assert_eq!(s.status(), SessionStatus::Expired);
        assert!(!s.awaits_deadline());
    }
}
