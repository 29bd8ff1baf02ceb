//! Core domain types for the task lifecycle engine.

use crate::status::{SubtaskStatus, TaskStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Criticality tier (priority). Ordering is `Low < Medium < High` so the
/// derived `Ord` gives criticality rank directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Criticality {
    Low,
    Medium,
    High,
}

impl Criticality {
    /// Parse a criticality string case-insensitively.
    /// Returns `Low` for unrecognized values, matching upstream data that
    /// defaults criticality to "Low".
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "high" => Criticality::High,
            "medium" => Criticality::Medium,
            "low" => Criticality::Low,
            _ => Criticality::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::High => "High",
            Criticality::Medium => "Medium",
            Criticality::Low => "Low",
        }
    }
}

/// Acting-user role. Privileged actors (admins) may reassign tasks and move
/// tasks out of `Completed`; auditors may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Auditor,
}

impl Role {
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Identity of the user driving the board. Sent with every backend query so
/// the server can scope the task list; the engine never filters by role
/// locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Admin-only scoping of the task list to one auditor or one client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntityFilter {
    #[default]
    All,
    Auditor(String),
    Client(String),
}

/// An id/name pair used to populate filter dropdowns (auditors, clients).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

/// One step in a task's subtask chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    /// Id scoped to the parent task; synthesized client-side when the task
    /// has no persisted subtasks yet.
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Estimated time in hours, non-negative.
    pub estimated_hours: f64,
    pub status: SubtaskStatus,
}

/// A task record.
///
/// Created by the backend (activity assignment) and fetched, never locally
/// originated except as optimistic placeholders. Status lives in the internal
/// vocabulary; the domain strings appear only in the wire layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub criticality: Criticality,
    /// Free text; required input when transitioning into `Pending`, may be
    /// empty for any status otherwise.
    pub remarks: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    /// Auditor-reported hours.
    pub time_taken: f64,
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Whether the task was assigned within the given window (used to flag
    /// "recently assigned" badges; the window is configured, default 24h).
    pub fn recently_assigned(&self, now: DateTime<Utc>, window_hours: i64) -> bool {
        match self.assigned_at {
            Some(at) => now.signed_duration_since(at) <= Duration::hours(window_hours),
            None => false,
        }
    }

    /// Aggregate "standard time" for a task with subtasks: the sum of
    /// subtask estimates. Derived, never independently edited. `None` when
    /// the task has no subtasks.
    pub fn standard_time(&self) -> Option<f64> {
        if self.subtasks.is_empty() {
            return None;
        }
        Some(self.subtasks.iter().map(|s| s.estimated_hours).sum())
    }
}

/// Partial in-place update for one task, used by optimistic applies.
/// Only the fields set are merged; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub remarks: Option<Option<String>>,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub time_taken: Option<f64>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(Some(remarks.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.remarks.is_none()
            && self.assignee_id.is_none()
            && self.assignee_name.is_none()
            && self.due_date.is_none()
            && self.time_taken.is_none()
    }
}

/// Aggregate statistics over the current task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn count_for(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Pending => self.pending,
            TaskStatus::Completed => self.completed,
        }
    }
}
