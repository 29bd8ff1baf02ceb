//! Optimistic mutation protocol.
//!
//! Every user-driven change follows the same shape: validate, snapshot the
//! task, apply the new value to the collection immediately (the UI reflects
//! it with no perceptible latency), then issue the remote call. A success
//! response confirms the already-applied value, optionally reconciling
//! server-computed fields; any failure restores the snapshot and emits
//! exactly one error notification.
//!
//! In-flight mutations are serialized per task id: two rapid actions on the
//! same task queue behind a `tokio::sync::Mutex`, while actions on different
//! tasks proceed independently. A revision counter guards against stale
//! responses: if something else rewrote the task while the call was in
//! flight (a refresh, a removal), the late outcome is logged and discarded
//! instead of being applied over newer state.

use crate::backend::{BackendError, PatchOutcome, TaskBackend, TaskPatchRequest};
use crate::collection::TaskCollection;
use crate::error::{EngineError, EngineResult};
use crate::notify::NotificationBus;
use crate::status::TaskStatus;
use crate::subtask::SubtaskAction;
use crate::types::{Actor, Task, TaskPatch};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// How a mutation attempt concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Applied locally and confirmed by the backend.
    Confirmed,
    /// Deliberately not performed (e.g. non-privileged actor touching a
    /// completed task). No local change, no remote call, no error.
    NoOp,
    /// Transition into `Pending` needs remarks before anything happens.
    /// Resubmit the same call with remarks collected from the prompt.
    RemarksRequired { task_id: String, target: TaskStatus },
    /// The response arrived after the task was rewritten locally; the
    /// outcome was discarded.
    Stale,
}

/// Applies local changes ahead of their remote confirmation and rolls them
/// back on failure.
pub struct OptimisticMutator {
    backend: Arc<dyn TaskBackend>,
    collection: Arc<Mutex<TaskCollection>>,
    notifier: Arc<NotificationBus>,
    /// Per-task in-flight mutation locks. The map itself is touched only
    /// briefly; the inner lock is held across the remote call.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OptimisticMutator {
    pub fn new(
        backend: Arc<dyn TaskBackend>,
        collection: Arc<Mutex<TaskCollection>>,
        notifier: Arc<NotificationBus>,
    ) -> Self {
        Self {
            backend,
            collection,
            notifier,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, task_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        // An entry held only by the map has no in-flight mutation behind
        // it; dropping idle entries here keeps the map bounded by the
        // number of concurrently mutated tasks.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(task_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Change a task's workflow status.
    ///
    /// Rules:
    /// - Transitioning into `Pending` without non-empty remarks defers the
    ///   whole mutation (`RemarksRequired`): no optimistic apply, no remote
    ///   call, until the prompt supplies text.
    /// - A task already `Completed` is terminal for non-privileged actors;
    ///   the attempt is a silent no-op, not an error.
    /// - Every other forward or backward transition is permitted.
    pub async fn change_status(
        &self,
        actor: &Actor,
        task_id: &str,
        target: TaskStatus,
        remarks: Option<String>,
    ) -> EngineResult<MutationOutcome> {
        let task_lock = self.lock_for(task_id);
        let _in_flight = task_lock.lock().await;

        let snapshot = {
            let collection = self.collection.lock().unwrap();
            let task = collection
                .get(task_id)
                .ok_or_else(|| EngineError::task_not_found(task_id))?;

            if task.status == TaskStatus::Completed && !actor.role.is_privileged() {
                debug!(task_id, "completed task is terminal for non-privileged actor");
                return Ok(MutationOutcome::NoOp);
            }
            task.clone()
        };

        let remarks = remarks.filter(|r| !r.trim().is_empty());
        if target == TaskStatus::Pending && remarks.is_none() {
            return Ok(MutationOutcome::RemarksRequired {
                task_id: task_id.to_string(),
                target,
            });
        }

        // Optimistic apply
        let mut patch = TaskPatch::status(target);
        if let Some(text) = &remarks {
            patch = patch.with_remarks(text.clone());
        }
        let expected_revision = self.apply(task_id, &patch);

        let request = TaskPatchRequest {
            status: Some(target),
            remarks,
            ..Default::default()
        };
        let result = self.backend.patch_task(task_id, &request).await;

        self.settle(
            task_id,
            snapshot,
            expected_revision,
            result,
            "Task status updated",
            |_| None,
        )
    }

    /// Reassign a task to a new assignee, optionally moving its due date
    /// and/or status. Privileged actors only.
    pub async fn reassign(
        &self,
        actor: &Actor,
        task_id: &str,
        new_assignee_id: &str,
        due_date: Option<NaiveDate>,
        status: Option<TaskStatus>,
        remarks: Option<String>,
    ) -> EngineResult<MutationOutcome> {
        if !actor.role.is_privileged() {
            return Err(EngineError::invalid_value(
                "role",
                "only administrators can reassign tasks",
            ));
        }
        if new_assignee_id.trim().is_empty() {
            return Err(EngineError::missing_field("assignee"));
        }

        let task_lock = self.lock_for(task_id);
        let _in_flight = task_lock.lock().await;

        let snapshot = {
            let collection = self.collection.lock().unwrap();
            collection
                .get(task_id)
                .cloned()
                .ok_or_else(|| EngineError::task_not_found(task_id))?
        };

        let remarks = remarks.filter(|r| !r.trim().is_empty());
        if status == Some(TaskStatus::Pending) && remarks.is_none() {
            return Ok(MutationOutcome::RemarksRequired {
                task_id: task_id.to_string(),
                target: TaskStatus::Pending,
            });
        }

        let mut patch = TaskPatch {
            assignee_id: Some(new_assignee_id.to_string()),
            due_date,
            status,
            ..Default::default()
        };
        if let Some(text) = &remarks {
            patch = patch.with_remarks(text.clone());
        }
        let expected_revision = self.apply(task_id, &patch);

        let request = TaskPatchRequest {
            status,
            remarks,
            assignee: Some(new_assignee_id.to_string()),
            due_date,
        };
        let result = self.backend.patch_task(task_id, &request).await;

        self.settle(
            task_id,
            snapshot,
            expected_revision,
            result,
            "Task reassigned",
            // Reconcile the server-normalized assignee display name
            |outcome| {
                outcome.assignee_name.clone().map(|name| TaskPatch {
                    assignee_name: Some(name),
                    ..Default::default()
                })
            },
        )
    }

    /// Progress one subtask through its forward-only workflow
    /// (`Start` or `Complete`).
    pub async fn advance_subtask(
        &self,
        task_id: &str,
        subtask_id: &str,
        action: SubtaskAction,
    ) -> EngineResult<MutationOutcome> {
        let task_lock = self.lock_for(task_id);
        let _in_flight = task_lock.lock().await;

        let (snapshot, new_status) = {
            let collection = self.collection.lock().unwrap();
            let task = collection
                .get(task_id)
                .ok_or_else(|| EngineError::task_not_found(task_id))?;
            let subtask = task
                .subtasks
                .iter()
                .find(|s| s.id == subtask_id)
                .ok_or_else(|| EngineError::subtask_not_found(subtask_id))?;
            (task.clone(), action.advance(subtask.status)?)
        };

        let expected_revision = {
            let mut collection = self.collection.lock().unwrap();
            collection.patch_subtask(task_id, subtask_id, new_status);
            collection.revision(task_id)
        };

        let result = self.backend.patch_subtask(subtask_id, new_status).await;

        self.settle(
            task_id,
            snapshot,
            expected_revision,
            result,
            "Subtask updated",
            |_| None,
        )
    }

    fn apply(&self, task_id: &str, patch: &TaskPatch) -> u64 {
        let mut collection = self.collection.lock().unwrap();
        collection.patch(task_id, patch);
        collection.revision(task_id)
    }

    /// Shared completion path: confirm, reconcile, or roll back.
    fn settle(
        &self,
        task_id: &str,
        snapshot: Task,
        expected_revision: u64,
        result: Result<PatchOutcome, BackendError>,
        success_message: &str,
        reconcile: impl Fn(&PatchOutcome) -> Option<TaskPatch>,
    ) -> EngineResult<MutationOutcome> {
        let mut collection = self.collection.lock().unwrap();

        // The task was rewritten while the call was in flight (refresh,
        // removal). Whatever the backend said no longer describes current
        // state; applying it blindly would clobber the newer value.
        if collection.revision(task_id) != expected_revision {
            warn!(task_id, "discarding stale mutation response");
            return Ok(MutationOutcome::Stale);
        }

        match result {
            Ok(outcome) if outcome.success => {
                if let Some(patch) = reconcile(&outcome)
                    && !patch.is_empty()
                {
                    collection.patch(task_id, &patch);
                }
                self.notifier.success(success_message);
                Ok(MutationOutcome::Confirmed)
            }
            Ok(outcome) => {
                collection.restore(snapshot);
                let err = EngineError::server_rejected(outcome.message);
                self.notifier.error(err.message.clone());
                Err(err)
            }
            Err(transport) => {
                collection.restore(snapshot);
                warn!(task_id, error = %transport, "remote call failed, rolled back");
                let err = EngineError::network(transport);
                self.notifier.error("Failed to update task. Please try again.");
                Err(err)
            }
        }
    }
}
