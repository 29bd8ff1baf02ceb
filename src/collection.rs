//! In-memory task collection.
//!
//! Holds the session's task records and derives per-status statistics.
//! Statistics are always recomputed from the current member set rather than
//! incrementally drifted, so counts and members cannot diverge after a
//! partial failure.

use crate::status::TaskStatus;
use crate::types::{Task, TaskPatch, TaskStats};
use std::collections::HashMap;
use tracing::debug;

/// The in-memory set of task records for the current session.
#[derive(Debug, Default)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    /// Per-task write markers, valued from `next_revision`. Entries are
    /// pruned with their tasks; the stale guard stays correct because an
    /// in-flight mutation that captured revision `n` then reads either 0
    /// (pruned) or a strictly larger value (rewritten), never `n` again.
    revisions: HashMap<String, u64>,
    /// Collection-wide monotonic counter. Revision values never repeat,
    /// even for an id that is pruned and later re-added by a refresh.
    next_revision: u64,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale refresh from a fetch. Replaces the member set and rebuilds
    /// the revision map: every incoming task gets a fresh revision and ids
    /// absent from the fetch are pruned.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut revisions = HashMap::with_capacity(tasks.len());
        for task in &tasks {
            self.next_revision += 1;
            revisions.insert(task.id.clone(), self.next_revision);
        }
        self.revisions = revisions;
        debug!(count = tasks.len(), "task collection replaced");
        self.tasks = tasks;
    }

    /// Insert one new task at the head (used after a successful new
    /// assignment so it renders first).
    pub fn append(&mut self, task: Task) {
        self.bump(&task.id);
        self.tasks.insert(0, task);
    }

    /// Remove a task by id. Returns the removed record, if present. The
    /// revision entry goes with the task, so an in-flight mutation on it
    /// settles as stale.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        self.revisions.remove(id);
        Some(self.tasks.remove(pos))
    }

    /// In-place field merge for one task. Returns `false` if the id is
    /// unknown. Every successful patch bumps the task's revision.
    pub fn patch(&mut self, id: &str, patch: &TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(remarks) = &patch.remarks {
            task.remarks = remarks.clone();
        }
        if let Some(assignee_id) = &patch.assignee_id {
            task.assignee_id = Some(assignee_id.clone());
        }
        if let Some(assignee_name) = &patch.assignee_name {
            task.assignee_name = Some(assignee_name.clone());
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(time_taken) = patch.time_taken {
            task.time_taken = time_taken;
        }
        self.bump(id);
        true
    }

    /// Replace one task wholesale (used by rollback to restore a
    /// pre-mutation snapshot).
    pub fn restore(&mut self, snapshot: Task) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == snapshot.id) else {
            return false;
        };
        let id = snapshot.id.clone();
        *task = snapshot;
        self.bump(&id);
        true
    }

    /// Set one subtask's status in place. Returns `false` if the task or
    /// subtask id is unknown.
    pub fn patch_subtask(
        &mut self,
        task_id: &str,
        subtask_id: &str,
        status: crate::status::SubtaskStatus,
    ) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return false;
        };
        let Some(subtask) = task.subtasks.iter_mut().find(|s| s.id == subtask_id) else {
            return false;
        };
        subtask.status = status;
        self.bump(task_id);
        true
    }

    /// Replace a task's subtask chain (from a subtask list fetch).
    pub fn set_subtasks(&mut self, task_id: &str, subtasks: Vec<crate::types::Subtask>) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return false;
        };
        task.subtasks = subtasks;
        self.bump(task_id);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Current write revision for a task id (0 if absent).
    pub fn revision(&self, id: &str) -> u64 {
        self.revisions.get(id).copied().unwrap_or(0)
    }

    fn bump(&mut self, id: &str) {
        self.next_revision += 1;
        self.revisions.insert(id.to_string(), self.next_revision);
    }

    /// Derived statistics, recomputed from the member set on every call.
    pub fn stats(&self) -> TaskStats {
        let mut stats = TaskStats {
            total: self.tasks.len(),
            ..Default::default()
        };
        for task in &self.tasks {
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
        }
        stats
    }
}
