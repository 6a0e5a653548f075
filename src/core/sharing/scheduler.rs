//! Timed sharing: grant now, revoke at each student's deadline
//!
//! The session table is the only state shared between the clock and explicit
//! stops. Both paths claim sessions under one lock (Active to Expired, taking
//! the permission ids) and issue the remote delete after releasing it, so a
//! student is revoked by whichever path claims first and by nobody else.

use crate::adapters::store::{DocumentStore, Mutation, MutationOutput};
use crate::config::OverridePolicy;
use crate::core::batch::{BatchOperationRunner, ItemStatus};
use crate::core::retry::RetryExecutor;
use crate::domain::ids::{FileId, PermissionId, StudentId};
use crate::domain::{ExamGenError, Minutes, Result, SessionStatus, ShareSession, Student};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// A student together with the workspace to share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTarget {
    pub student: Student,
    pub workspace: FileId,
}

/// Deadline (in minutes from the start of sharing) for one student
///
/// The override wins whenever it is set, except under
/// [`OverridePolicy::FiniteOnly`] where it cannot put an indefinite share on
/// the clock. No override and no default means indefinite.
pub fn effective_duration(
    student: &Student,
    default: Option<Minutes>,
    policy: OverridePolicy,
) -> Option<Minutes> {
    match (student.override_duration, default, policy) {
        (Some(own), _, OverridePolicy::Always) => Some(own),
        (Some(own), Some(_), OverridePolicy::FiniteOnly) => Some(own),
        (Some(_), None, OverridePolicy::FiniteOnly) => None,
        (None, default, _) => default,
    }
}

/// Result of granting access
#[derive(Debug, Default)]
pub struct GrantOutcome {
    /// Students now holding an active session
    pub granted: Vec<StudentId>,
    /// Of those, students placed on the clock
    pub timed: usize,
    /// Students skipped because they already had an active session
    pub already_active: Vec<StudentId>,
    /// Students whose grant failed
    pub failures: Vec<(StudentId, ExamGenError)>,
}

/// Result of revoking access (tick or explicit stop)
#[derive(Debug, Default)]
pub struct RevokeOutcome {
    pub revoked: Vec<StudentId>,
    /// Stop requests for sessions that had already expired
    pub already_expired: Vec<StudentId>,
    pub failures: Vec<(StudentId, ExamGenError)>,
}

impl RevokeOutcome {
    fn merge(&mut self, other: RevokeOutcome) {
        self.revoked.extend(other.revoked);
        self.already_expired.extend(other.already_expired);
        self.failures.extend(other.failures);
    }
}

/// Result of one clock tick
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Minute reached by this tick
    pub minute: u32,
    pub revoke: RevokeOutcome,
    /// No timed session remains active; the clock has nothing left to do
    pub clock_done: bool,
}

/// Result of running the clock to completion or shutdown
#[derive(Debug, Default)]
pub struct ClockOutcome {
    pub ticks: u32,
    pub revoke: RevokeOutcome,
    /// Stopped by the shutdown signal with timed sessions still active
    pub interrupted: bool,
}

/// Snapshot of the session table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub minute: u32,
    pub active: usize,
    pub timed_pending: usize,
    pub expired: usize,
}

#[derive(Default)]
struct SessionTable {
    minute: u32,
    sessions: HashMap<StudentId, ShareSession>,
    deadlines: BinaryHeap<Reverse<(u32, StudentId)>>,
    timed_pending: usize,
    /// Students whose grant is in flight
    reserved: HashSet<StudentId>,
}

/// Revocation claimed under the lock, executed after it is released
struct Claim {
    student: StudentId,
    workspace: FileId,
    permissions: Vec<PermissionId>,
}

impl SessionTable {
    /// Moves an active session to Expired and takes its permissions
    fn claim(&mut self, id: &StudentId) -> Option<Claim> {
        let session = self.sessions.get_mut(id)?;
        let was_timed = session.awaits_deadline();
        if !session.expire() {
            return None;
        }
        if was_timed {
            self.timed_pending -= 1;
        }
        Some(Claim {
            student: id.clone(),
            workspace: session.workspace.clone(),
            permissions: std::mem::take(&mut session.permission_ids),
        })
    }

    /// Claims every session whose deadline is at or before the current minute
    fn claim_due(&mut self) -> Vec<Claim> {
        let mut due = Vec::new();
        while let Some(Reverse((deadline, _))) = self.deadlines.peek() {
            if *deadline > self.minute {
                break;
            }
            let Some(Reverse((deadline, id))) = self.deadlines.pop() else {
                break;
            };
            // entries for stopped sessions are dropped here
            let current = self
                .sessions
                .get(&id)
                .is_some_and(|s| s.is_active() && s.deadline == Some(Minutes::new(deadline)));
            if current {
                due.extend(self.claim(&id));
            }
        }
        due
    }
}

/// Grants workspace access and revokes it on a virtual minute clock
pub struct AccessScheduler {
    table: Mutex<SessionTable>,
    store: Arc<dyn DocumentStore>,
    runner: BatchOperationRunner,
    retry: RetryExecutor,
    role: String,
    policy: OverridePolicy,
    tick: Duration,
}

impl AccessScheduler {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        retry: RetryExecutor,
        role: impl Into<String>,
        policy: OverridePolicy,
        tick: Duration,
    ) -> Self {
        Self {
            table: Mutex::new(SessionTable::default()),
            runner: BatchOperationRunner::new(store.clone()),
            store,
            retry,
            role: role.into(),
            policy,
            tick,
        }
    }

    /// Grants access to every target in one batch and opens their sessions
    ///
    /// Deadlines are counted from the current clock minute. A student with an
    /// active session, or with a grant already in flight from a concurrent
    /// call, is skipped as already active.
    pub async fn start_sharing(
        &self,
        targets: Vec<ShareTarget>,
        default_duration: Option<Minutes>,
    ) -> GrantOutcome {
        let mut outcome = GrantOutcome::default();

        let targets: Vec<ShareTarget> = {
            let mut table = self.table.lock().await;
            let table = &mut *table;
            targets
                .into_iter()
                .filter(|t| {
                    let active = table
                        .sessions
                        .get(&t.student.id)
                        .is_some_and(ShareSession::is_active);
                    if active || !table.reserved.insert(t.student.id.clone()) {
                        outcome.already_active.push(t.student.id.clone());
                        return false;
                    }
                    true
                })
                .collect()
        };

        let mutations = targets
            .iter()
            .map(|t| Mutation::CreatePermission {
                resource: t.workspace.clone(),
                email: t.student.email.clone(),
                role: self.role.clone(),
            })
            .collect();
        let report = self.runner.run("grant", mutations).await;

        let mut table = self.table.lock().await;
        for target in &targets {
            table.reserved.remove(&target.student.id);
        }
        let now = table.minute;
        for (target, item) in targets.into_iter().zip(report.outcomes) {
            let id = target.student.id.clone();
            let permission = match item.status {
                ItemStatus::Succeeded(MutationOutput::Created(permission)) => permission,
                ItemStatus::Failed(e) => {
                    outcome.failures.push((id, e));
                    continue;
                }
                other => {
                    outcome.failures.push((
                        id,
                        ExamGenError::Other(format!("unexpected grant result: {other:?}")),
                    ));
                    continue;
                }
            };

            let duration = effective_duration(&target.student, default_duration, self.policy);
            let deadline = duration.map(|d| Minutes::new(now.saturating_add(d.get())));
            if let Some(deadline) = deadline {
                table.deadlines.push(Reverse((deadline.get(), id.clone())));
                table.timed_pending += 1;
                outcome.timed += 1;
            }

            tracing::info!(
                student = %target.student.display_name(),
                workspace = %target.workspace,
                deadline = ?deadline.map(Minutes::get),
                "Access granted"
            );

            table.sessions.insert(
                id.clone(),
                ShareSession::new(target.student, target.workspace, deadline, vec![permission]),
            );
            outcome.granted.push(id);
        }

        outcome
    }

    /// Advances the clock by one minute and revokes everyone due
    ///
    /// All students reaching their deadline on this tick are revoked in one batch.
    pub async fn advance_minute(&self) -> TickOutcome {
        let (minute, due) = {
            let mut table = self.table.lock().await;
            table.minute += 1;
            (table.minute, table.claim_due())
        };

        if !due.is_empty() {
            tracing::info!(minute = minute, students = due.len(), "Deadline reached");
        }
        let revoke = self.revoke(due).await;
        let clock_done = self.table.lock().await.timed_pending == 0;

        TickOutcome {
            minute,
            revoke,
            clock_done,
        }
    }

    /// Drives the clock at the configured cadence until no timed session
    /// remains or `shutdown` turns true
    ///
    /// Session state is not persisted: after a shutdown the remaining grants
    /// stay in place until `unshare` is run.
    pub async fn run_clock(&self, mut shutdown: watch::Receiver<bool>) -> ClockOutcome {
        let mut outcome = ClockOutcome::default();
        if self.table.lock().await.timed_pending == 0 {
            return outcome;
        }

        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + self.tick, self.tick);
        let mut shutdown_open = true;

        loop {
            if *shutdown.borrow() {
                outcome.interrupted = true;
                break;
            }

            tokio::select! {
                _ = interval.tick() => {
                    let tick = self.advance_minute().await;
                    outcome.ticks += 1;
                    outcome.revoke.merge(tick.revoke);
                    if tick.clock_done {
                        tracing::info!(minute = tick.minute, "All timed sessions expired; clock stopped");
                        break;
                    }
                }
                changed = shutdown.changed(), if shutdown_open => {
                    if changed.is_err() {
                        shutdown_open = false;
                    }
                }
            }
        }

        if outcome.interrupted {
            let status = self.status().await;
            tracing::warn!(
                minute = status.minute,
                still_shared = status.active,
                "Clock stopped by shutdown; remaining shares stay granted"
            );
        }
        outcome
    }

    /// Revokes the listed students now, whatever the clock says
    ///
    /// Students with a session in this scheduler are claimed like a tick would;
    /// stopping an already expired session is a no-op. Students without a
    /// session (a later `unshare` run) have their grants looked up by email on
    /// the workspace, the owner's own permission excluded.
    pub async fn stop_sharing(&self, targets: &[ShareTarget]) -> RevokeOutcome {
        let mut outcome = RevokeOutcome::default();
        let mut claims = Vec::new();
        let mut unmanaged = Vec::new();

        {
            let mut table = self.table.lock().await;
            for target in targets {
                let id = &target.student.id;
                if !table.sessions.contains_key(id) {
                    unmanaged.push(target);
                    continue;
                }
                match table.claim(id) {
                    Some(claim) => claims.push(claim),
                    None => outcome.already_expired.push(id.clone()),
                }
            }
        }

        for target in unmanaged {
            match self.lookup_grants(target).await {
                Ok(permissions) if permissions.is_empty() => {
                    tracing::info!(
                        student = %target.student.display_name(),
                        "No grant to revoke"
                    );
                    outcome.already_expired.push(target.student.id.clone());
                }
                Ok(permissions) => claims.push(Claim {
                    student: target.student.id.clone(),
                    workspace: target.workspace.clone(),
                    permissions,
                }),
                Err(e) => outcome.failures.push((target.student.id.clone(), e)),
            }
        }

        outcome.merge(self.revoke(claims).await);
        outcome
    }

    async fn lookup_grants(&self, target: &ShareTarget) -> Result<Vec<PermissionId>> {
        let permissions = self
            .retry
            .run("list permissions", || self.store.get_permissions(&target.workspace))
            .await?;
        Ok(permissions
            .into_iter()
            .filter(|p| p.is_grant_for(&target.student.email))
            .map(|p| p.id)
            .collect())
    }

    /// Issues one batch deleting every claimed permission
    async fn revoke(&self, claims: Vec<Claim>) -> RevokeOutcome {
        let mut outcome = RevokeOutcome::default();
        if claims.is_empty() {
            return outcome;
        }

        let mut owners = Vec::new();
        let mut mutations = Vec::new();
        for claim in &claims {
            for permission in &claim.permissions {
                owners.push(claim.student.clone());
                mutations.push(Mutation::DeletePermission {
                    resource: claim.workspace.clone(),
                    permission: permission.clone(),
                });
            }
        }

        let report = self.runner.run("revoke", mutations).await;
        let mut failed: HashMap<StudentId, ExamGenError> = HashMap::new();
        for item in report.outcomes {
            if let ItemStatus::Failed(e) = item.status {
                failed.entry(owners[item.index].clone()).or_insert(e);
            }
        }

        for claim in claims {
            match failed.remove(&claim.student) {
                Some(e) => {
                    tracing::error!(
                        student = %claim.student,
                        error = %e,
                        "Revoke failed; access may still be granted"
                    );
                    outcome.failures.push((claim.student, e));
                }
                None => {
                    tracing::info!(student = %claim.student, "Access revoked");
                    outcome.revoked.push(claim.student);
                }
            }
        }
        outcome
    }

    /// Current session status of one student
    pub async fn session_status(&self, id: &StudentId) -> Option<SessionStatus> {
        self.table.lock().await.sessions.get(id).map(ShareSession::status)
    }

    pub async fn status(&self) -> SchedulerStatus {
        let table = self.table.lock().await;
        let active = table.sessions.values().filter(|s| s.is_active()).count();
        SchedulerStatus {
            minute: table.minute,
            active,
            timed_pending: table.timed_pending,
            expired: table.sessions.len() - active,
        }
    }
}
