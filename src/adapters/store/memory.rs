//! In-memory store used by unit tests

use super::traits::{
    DocumentStore, DriveItem, DriveQuery, LedgerSink, Permission, RosterSource, FOLDER_MIME_TYPE,
    SPREADSHEET_MIME_TYPE,
};
use crate::domain::ids::{FileId, PermissionId};
use crate::domain::{ExamGenError, RemoteError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct State {
    items: Vec<DriveItem>,
    permissions: HashMap<FileId, Vec<Permission>>,
    ranges: HashMap<FileId, Vec<Vec<String>>>,
    ledgers: HashMap<FileId, (String, Vec<Vec<String>>)>,
    failures: HashMap<String, VecDeque<RemoteError>>,
    copies: usize,
    deletes: usize,
    copies_beside_source: bool,
    grant_latency: Option<Duration>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn take_failure(&mut self, key: &str) -> Result<()> {
        match self.failures.get_mut(key).and_then(VecDeque::pop_front) {
            Some(err) => Err(ExamGenError::Remote(err)),
            None => Ok(()),
        }
    }
}

/// Document store, roster and ledger backed by plain collections
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_item(&self, name: &str, parent: Option<&FileId>, mime_type: &str) -> FileId {
        let mut state = self.lock();
        let id = FileId::new(state.next_id("file")).unwrap();
        state.items.push(DriveItem {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parents: parent.into_iter().cloned().collect(),
        });
        id
    }

    pub fn add_folder(&self, name: &str, parent: Option<&FileId>) -> FileId {
        self.add_item(name, parent, FOLDER_MIME_TYPE)
    }

    pub fn add_sheet(&self, name: &str, parent: &FileId, rows: Vec<Vec<&str>>) -> FileId {
        let id = self.add_item(name, Some(parent), SPREADSHEET_MIME_TYPE);
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        self.lock().ranges.insert(id.clone(), rows);
        id
    }

    /// Queues an error returned by the next call identified by `key`
    ///
    /// Keys are `copy:<source id>`, `move`, `create_permission:<email>`,
    /// `delete_permission:<permission id>`, `list`, `append_rows`.
    pub fn fail_next(&self, key: &str, err: RemoteError) {
        self.lock()
            .failures
            .entry(key.to_string())
            .or_default()
            .push_back(err);
    }

    /// Makes `copy` ignore the requested parent and keep the source's parents
    pub fn place_copies_beside_source(&self) {
        self.lock().copies_beside_source = true;
    }

    /// Delays every `create_permission` call by `latency`
    pub fn set_grant_latency(&self, latency: Duration) {
        self.lock().grant_latency = Some(latency);
    }

    pub fn children(&self, parent: &FileId) -> Vec<DriveItem> {
        self.lock()
            .items
            .iter()
            .filter(|i| i.parents.contains(parent))
            .cloned()
            .collect()
    }

    pub fn permissions(&self, resource: &FileId) -> Vec<Permission> {
        self.lock()
            .permissions
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    pub fn copy_count(&self) -> usize {
        self.lock().copies
    }

    pub fn delete_count(&self) -> usize {
        self.lock().deletes
    }

    pub fn ledger_rows(&self) -> Vec<(String, Vec<Vec<String>>)> {
        self.lock().ledgers.values().cloned().collect()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list(&self, query: &DriveQuery) -> Result<Vec<DriveItem>> {
        let mut state = self.lock();
        state.take_failure("list")?;
        Ok(state
            .items
            .iter()
            .filter(|i| query.matches(i))
            .cloned()
            .collect())
    }

    async fn create_folder(&self, name: &str, parent: &FileId) -> Result<FileId> {
        Ok(self.add_folder(name, Some(parent)))
    }

    async fn copy(&self, source: &FileId, new_name: &str, parent: &FileId) -> Result<DriveItem> {
        let mut state = self.lock();
        state.take_failure(&format!("copy:{source}"))?;
        let original = state
            .items
            .iter()
            .find(|i| &i.id == source)
            .cloned()
            .ok_or_else(|| ExamGenError::Remote(RemoteError::NotFound(source.to_string())))?;
        let parents = if state.copies_beside_source {
            original.parents.clone()
        } else {
            vec![parent.clone()]
        };
        let copy = DriveItem {
            id: FileId::new(state.next_id("copy")).unwrap(),
            name: new_name.to_string(),
            parents,
            ..original
        };
        state.items.push(copy.clone());
        state.copies += 1;
        Ok(copy)
    }

    async fn move_file(
        &self,
        id: &FileId,
        from_parents: &[FileId],
        to_parent: &FileId,
    ) -> Result<()> {
        let mut state = self.lock();
        state.take_failure("move")?;
        let item = state
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| ExamGenError::Remote(RemoteError::NotFound(id.to_string())))?;
        item.parents.retain(|p| !from_parents.contains(p));
        item.parents.push(to_parent.clone());
        Ok(())
    }

    async fn delete_file(&self, id: &FileId) -> Result<()> {
        let mut state = self.lock();
        let before = state.items.len();
        state.items.retain(|i| &i.id != id);
        if state.items.len() == before {
            return Err(ExamGenError::Remote(RemoteError::NotFound(id.to_string())));
        }
        Ok(())
    }

    async fn get_permissions(&self, resource: &FileId) -> Result<Vec<Permission>> {
        Ok(self.permissions(resource))
    }

    async fn create_permission(
        &self,
        resource: &FileId,
        email: &str,
        role: &str,
    ) -> Result<PermissionId> {
        let latency = self.lock().grant_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        state.take_failure(&format!("create_permission:{email}"))?;
        let id = PermissionId::new(state.next_id("perm")).unwrap();
        state
            .permissions
            .entry(resource.clone())
            .or_default()
            .push(Permission {
                id: id.clone(),
                email_address: Some(email.to_string()),
                role: role.to_string(),
            });
        Ok(id)
    }

    async fn delete_permission(&self, resource: &FileId, permission: &PermissionId) -> Result<()> {
        let mut state = self.lock();
        state.take_failure(&format!("delete_permission:{permission}"))?;
        state.deletes += 1;
        let grants = state.permissions.entry(resource.clone()).or_default();
        let before = grants.len();
        grants.retain(|p| &p.id != permission);
        if grants.len() == before {
            return Err(ExamGenError::Remote(RemoteError::NotFound(permission.to_string())));
        }
        Ok(())
    }
}

#[async_trait]
impl RosterSource for InMemoryStore {
    async fn read_range(&self, sheet: &FileId, _range: &str) -> Result<Vec<Vec<String>>> {
        self.lock()
            .ranges
            .get(sheet)
            .cloned()
            .ok_or_else(|| ExamGenError::Remote(RemoteError::NotFound(sheet.to_string())))
    }
}

#[async_trait]
impl LedgerSink for InMemoryStore {
    async fn create_sheet(&self, title: &str) -> Result<FileId> {
        let mut state = self.lock();
        let id = FileId::new(state.next_id("ledger")).unwrap();
        state
            .ledgers
            .insert(id.clone(), (title.to_string(), Vec::new()));
        Ok(id)
    }

    async fn append_rows(&self, sheet: &FileId, rows: Vec<Vec<String>>) -> Result<()> {
        let mut state = self.lock();
        state.take_failure("append_rows")?;
        let ledger = state
            .ledgers
            .get_mut(sheet)
            .ok_or_else(|| ExamGenError::Remote(RemoteError::NotFound(sheet.to_string())))?;
        ledger.1.extend(rows);
        Ok(())
    }
}
