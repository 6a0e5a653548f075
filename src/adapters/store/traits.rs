//! Collaborator capabilities consumed by the core
//!
//! The core never talks HTTP. It sees the document service through
//! [`DocumentStore`], the class list through [`RosterSource`] and the audit
//! spreadsheet through [`LedgerSink`].

use crate::domain::ids::{FileId, PermissionId};
use crate::domain::{ExamGenError, RemoteError, Result};
use async_trait::async_trait;
use std::fmt;

/// MIME type of a folder
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME type of a spreadsheet
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// A file or folder in the document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveItem {
    pub id: FileId,
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<FileId>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// An access grant on a file or folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: PermissionId,
    pub email_address: Option<String>,
    pub role: String,
}

impl Permission {
    /// True when this permission was granted to `email` and is not the owner's own
    pub fn is_grant_for(&self, email: &str) -> bool {
        self.role != "owner"
            && self
                .email_address
                .as_deref()
                .is_some_and(|addr| addr.eq_ignore_ascii_case(email))
    }
}

/// Structured listing filter
///
/// Rendered to the Drive `q` syntax by [`DriveQuery::to_query_string`]; the
/// in-memory store used in tests evaluates it with [`DriveQuery::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveQuery {
    pub name: Option<String>,
    pub name_contains: Option<String>,
    pub parent: Option<FileId>,
    pub mime_type: Option<String>,
}

impl DriveQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    pub fn in_folder(mut self, parent: &FileId) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn of_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Drive v3 `q` parameter; trashed items are always excluded
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(name) = &self.name {
            clauses.push(format!("name = '{}'", escape_query_literal(name)));
        }
        if let Some(fragment) = &self.name_contains {
            clauses.push(format!("name contains '{}'", escape_query_literal(fragment)));
        }
        if let Some(parent) = &self.parent {
            clauses.push(format!("'{}' in parents", escape_query_literal(parent.as_str())));
        }
        if let Some(mime_type) = &self.mime_type {
            clauses.push(format!("mimeType = '{}'", escape_query_literal(mime_type)));
        }
        clauses.push("trashed = false".to_string());
        clauses.join(" and ")
    }

    /// Evaluates the filter against an item
    pub fn matches(&self, item: &DriveItem) -> bool {
        self.name.as_ref().map_or(true, |n| &item.name == n)
            && self
                .name_contains
                .as_ref()
                .map_or(true, |f| item.name.contains(f.as_str()))
            && self
                .parent
                .as_ref()
                .map_or(true, |p| item.parents.contains(p))
            && self
                .mime_type
                .as_ref()
                .map_or(true, |m| &item.mime_type == m)
    }
}

/// Escapes a string literal for the Drive query language
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// One independent remote mutation of a bulk request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Grant `role` on `resource` to `email`
    CreatePermission {
        resource: FileId,
        email: String,
        role: String,
    },
    /// Remove an existing grant
    DeletePermission {
        resource: FileId,
        permission: PermissionId,
    },
}

impl Mutation {
    pub fn is_delete(&self) -> bool {
        matches!(self, Mutation::DeletePermission { .. })
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::CreatePermission {
                resource,
                email,
                role,
            } => write!(f, "grant {role} on {resource} to {email}"),
            Mutation::DeletePermission {
                resource,
                permission,
            } => write!(f, "revoke {permission} on {resource}"),
        }
    }
}

/// Successful result of one [`Mutation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutput {
    /// A permission was created
    Created(PermissionId),
    /// A permission was deleted
    Deleted,
}

/// Document store capability set
///
/// Implementations translate transport failures into [`RemoteError`] wrapped in
/// [`ExamGenError::Remote`]; retry is the caller's business.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists every item matching `query`, following pagination
    async fn list(&self, query: &DriveQuery) -> Result<Vec<DriveItem>>;

    /// Creates a folder under `parent`
    async fn create_folder(&self, name: &str, parent: &FileId) -> Result<FileId>;

    /// Copies `source` into folder `parent` under `new_name`
    ///
    /// Returns the copy including the parents it actually landed in; a store
    /// that ignores `parent` leaves the caller to
    /// [`move_file`](DocumentStore::move_file) it into place.
    async fn copy(&self, source: &FileId, new_name: &str, parent: &FileId) -> Result<DriveItem>;

    /// Re-parents `id` from `from_parents` to `to_parent`
    async fn move_file(&self, id: &FileId, from_parents: &[FileId], to_parent: &FileId)
        -> Result<()>;

    /// Deletes a file
    async fn delete_file(&self, id: &FileId) -> Result<()>;

    /// Lists permissions on a resource
    async fn get_permissions(&self, resource: &FileId) -> Result<Vec<Permission>>;

    /// Grants `role` on `resource` to `email`
    async fn create_permission(&self, resource: &FileId, email: &str, role: &str)
        -> Result<PermissionId>;

    /// Deletes one permission
    async fn delete_permission(&self, resource: &FileId, permission: &PermissionId) -> Result<()>;

    /// Submits independent mutations and returns one outcome per mutation, in order
    ///
    /// The default runs them one after another; transports that can coalesce or
    /// fan out requests override it.
    async fn execute_batch(&self, mutations: Vec<Mutation>) -> Vec<Result<MutationOutput>> {
        let mut outcomes = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            outcomes.push(apply_mutation(self, mutation).await);
        }
        outcomes
    }
}

/// Runs one mutation against a store
pub async fn apply_mutation<S>(store: &S, mutation: Mutation) -> Result<MutationOutput>
where
    S: DocumentStore + ?Sized,
{
    match mutation {
        Mutation::CreatePermission {
            resource,
            email,
            role,
        } => store
            .create_permission(&resource, &email, &role)
            .await
            .map(MutationOutput::Created),
        Mutation::DeletePermission {
            resource,
            permission,
        } => store
            .delete_permission(&resource, &permission)
            .await
            .map(|()| MutationOutput::Deleted),
    }
}

/// Tabular roster source
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Reads `range` (A1 notation) of spreadsheet `sheet` as rows of cell strings
    ///
    /// Trailing empty cells may be omitted, so rows can be ragged.
    async fn read_range(&self, sheet: &FileId, range: &str) -> Result<Vec<Vec<String>>>;
}

/// Audit spreadsheet sink for variant assignments
#[async_trait]
pub trait LedgerSink: Send + Sync {
    /// Creates an empty spreadsheet and returns its id
    async fn create_sheet(&self, title: &str) -> Result<FileId>;

    /// Appends rows after the last non-empty row of the first sheet
    async fn append_rows(&self, sheet: &FileId, rows: Vec<Vec<String>>) -> Result<()>;
}

/// Validates a file id returned by the service
pub(crate) fn remote_file_id(raw: String) -> Result<FileId> {
    FileId::new(raw).map_err(|e| ExamGenError::Remote(RemoteError::InvalidResponse(e)))
}

/// Validates a permission id returned by the service
pub(crate) fn remote_permission_id(raw: String) -> Result<PermissionId> {
    PermissionId::new(raw).map_err(|e| ExamGenError::Remote(RemoteError::InvalidResponse(e)))
}
