//! End-to-end tests of the sharing clock against a recording document store
//!
//! Time is paused, so a sixty-second tick costs nothing.

use async_trait::async_trait;
use examgen::adapters::store::{DocumentStore, DriveItem, DriveQuery, Permission};
use examgen::config::OverridePolicy;
use examgen::core::retry::RetryExecutor;
use examgen::core::sharing::{AccessScheduler, ShareTarget};
use examgen::domain::{
    ExamGenError, FileId, Minutes, PermissionId, RemoteError, Result, SessionStatus, Student,
    StudentId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

const TICK: Duration = Duration::from_secs(60);

/// Records grants, and the clock minute at which each grant was deleted
struct RecordingStore {
    started: Instant,
    grants: Mutex<HashMap<PermissionId, (FileId, String)>>,
    deletions: Mutex<Vec<(String, u64)>>,
    next: Mutex<u32>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            grants: Mutex::new(HashMap::new()),
            deletions: Mutex::new(Vec::new()),
            next: Mutex::new(0),
        }
    }

    fn deleted_at(&self, email: &str) -> Vec<u64> {
        self.deletions
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e == email)
            .map(|(_, minute)| *minute)
            .collect()
    }

    fn active_grants(&self) -> usize {
        self.grants.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn list(&self, _query: &DriveQuery) -> Result<Vec<DriveItem>> {
        Ok(Vec::new())
    }

    async fn create_folder(&self, _name: &str, _parent: &FileId) -> Result<FileId> {
        unreachable!("sharing never creates folders")
    }

    async fn copy(&self, _source: &FileId, _new_name: &str, _parent: &FileId) -> Result<DriveItem> {
        unreachable!("sharing never copies")
    }

    async fn move_file(&self, _id: &FileId, _from: &[FileId], _to: &FileId) -> Result<()> {
        unreachable!("sharing never moves")
    }

    async fn delete_file(&self, _id: &FileId) -> Result<()> {
        unreachable!("sharing never deletes files")
    }

    async fn get_permissions(&self, resource: &FileId) -> Result<Vec<Permission>> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, (ws, _))| ws == resource)
            .map(|(id, (_, email))| Permission {
                id: id.clone(),
                email_address: Some(email.clone()),
                role: "writer".to_string(),
            })
            .collect())
    }

    async fn create_permission(
        &self,
        resource: &FileId,
        email: &str,
        _role: &str,
    ) -> Result<PermissionId> {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        let id = PermissionId::new(format!("perm-{next}")).unwrap();
        self.grants
            .lock()
            .unwrap()
            .insert(id.clone(), (resource.clone(), email.to_string()));
        Ok(id)
    }

    async fn delete_permission(&self, _resource: &FileId, permission: &PermissionId) -> Result<()> {
        let removed = self.grants.lock().unwrap().remove(permission);
        match removed {
            Some((_, email)) => {
                let minute = self.started.elapsed().as_secs() / TICK.as_secs();
                self.deletions.lock().unwrap().push((email, minute));
                Ok(())
            }
            None => Err(ExamGenError::Remote(RemoteError::NotFound(
                permission.to_string(),
            ))),
        }
    }
}

fn target(id: &str, override_minutes: Option<u32>) -> ShareTarget {
    let mut student = Student::new(
        StudentId::new(id).unwrap(),
        format!("Last{id}"),
        "First",
        format!("s{id}@x.edu"),
    );
    if let Some(m) = override_minutes {
        student = student.with_override(Minutes::new(m));
    }
    ShareTarget {
        student,
        workspace: FileId::new(format!("ws-{id}")).unwrap(),
    }
}

fn scheduler(store: &Arc<RecordingStore>) -> AccessScheduler {
    AccessScheduler::new(
        store.clone(),
        RetryExecutor::default(),
        "writer",
        OverridePolicy::Always,
        TICK,
    )
}

#[tokio::test(start_paused = true)]
async fn test_each_student_revoked_at_own_deadline() {
    let store = Arc::new(RecordingStore::new());
    let scheduler = scheduler(&store);
    let (_tx, rx) = watch::channel(false);

    let grant = scheduler
        .start_sharing(vec![target("1", Some(5)), target("2", None)], Some(Minutes::new(10)))
        .await;
    assert_eq!(grant.granted.len(), 2);
    assert_eq!(grant.timed, 2);

    let clock = scheduler.run_clock(rx).await;

    assert_eq!(store.deleted_at("s1@x.edu"), vec![5]);
    assert_eq!(store.deleted_at("s2@x.edu"), vec![10]);
    assert_eq!(clock.ticks, 10);
    assert_eq!(clock.revoke.revoked.len(), 2);
    assert!(!clock.interrupted);
    assert_eq!(store.active_grants(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_deadline_revokes_once() {
    let store = Arc::new(RecordingStore::new());
    let scheduler = scheduler(&store);
    let (_tx, rx) = watch::channel(false);

    scheduler
        .start_sharing(vec![target("1", None), target("2", None)], Some(Minutes::new(3)))
        .await;

    let stopped = scheduler.stop_sharing(&[target("1", None)]).await;
    assert_eq!(stopped.revoked.len(), 1);

    let clock = scheduler.run_clock(rx).await;

    assert_eq!(store.deleted_at("s1@x.edu"), vec![0]);
    assert_eq!(store.deleted_at("s2@x.edu"), vec![3]);
    assert_eq!(clock.revoke.revoked, vec![StudentId::new("2").unwrap()]);
    assert_eq!(
        scheduler.session_status(&StudentId::new("1").unwrap()).await,
        Some(SessionStatus::Expired)
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_remaining_grants() {
    let store = Arc::new(RecordingStore::new());
    let scheduler = Arc::new(scheduler(&store));
    let (tx, rx) = watch::channel(false);

    scheduler
        .start_sharing(vec![target("1", Some(2)), target("2", Some(30))], None)
        .await;

    let clock = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_clock(rx).await })
    };

    tokio::time::sleep(TICK * 5 + Duration::from_secs(1)).await;
    tx.send(true).unwrap();
    let clock = clock.await.unwrap();

    assert!(clock.interrupted);
    assert_eq!(store.deleted_at("s1@x.edu"), vec![2]);
    assert!(store.deleted_at("s2@x.edu").is_empty());
    assert_eq!(store.active_grants(), 1);
    assert_eq!(scheduler.status().await.active, 1);

    // stopping after shutdown still revokes the recorded grant
    let unshared = scheduler.stop_sharing(&[target("2", Some(30))]).await;
    assert_eq!(unshared.revoked.len(), 1);
    assert_eq!(store.active_grants(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unmanaged_unshare_without_grant_is_noop() {
    let store = Arc::new(RecordingStore::new());
    let scheduler = scheduler(&store);

    let outcome = scheduler.stop_sharing(&[target("9", None)]).await;

    assert!(outcome.revoked.is_empty());
    assert_eq!(outcome.already_expired, vec![StudentId::new("9").unwrap()]);
    assert!(outcome.failures.is_empty());
}
