//! Remote backend collaborator contract.
//!
//! The engine consumes the backend through this trait only; the transport is
//! implementation-defined (the production implementation speaks REST, the
//! test suite scripts outcomes). The wire vocabulary is the domain one;
//! decoding into the internal enums happens here, at the boundary, so
//! nothing past this module branches on raw status strings.
//!
//! The only success criterion the engine relies on is "call completed and
//! the body's success flag is true"; every other outcome is a failure for
//! the optimistic-mutation protocol.

use crate::status::{SubtaskStatus, TaskStatus};
use crate::types::{Criticality, EntityFilter, EntityRef, Role, Subtask, Task};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Transport-level failure. Server-reported rejections are not errors at
/// this layer; they arrive as [`PatchOutcome`] with `success == false`.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

/// Task id as it appears on the wire. The backend sends numeric ids in some
/// responses and strings in others; the engine always works with strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// A task record as returned by the list endpoint. Field names follow the
/// backend's JSON contract.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    pub id: RawId,
    pub task_name: String,
    /// Domain-vocabulary status string; not guaranteed valid.
    pub status: String,
    #[serde(default)]
    pub criticality: Option<String>,
    #[serde(default)]
    pub customer_id: Option<RawId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<RawId>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_taken: Option<f64>,
    // Carried on the wire but not load-bearing in the engine
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TaskRecord {
    /// Decode into the internal model. Total: unknown statuses and
    /// criticalities are defaulted (with a warning from the codec), never
    /// rejected.
    pub fn into_task(self) -> Task {
        Task {
            id: self.id.into_string(),
            name: self.task_name,
            client_id: self.customer_id.map(RawId::into_string),
            client_name: self.customer_name,
            assignee_id: self.assignee_id.map(RawId::into_string),
            assignee_name: self.assignee,
            status: TaskStatus::from_domain_str(&self.status),
            due_date: self.due_date,
            criticality: self
                .criticality
                .as_deref()
                .map(Criticality::parse)
                .unwrap_or(Criticality::Low),
            remarks: self.remarks,
            assigned_at: self.assigned_at,
            time_taken: self.time_taken.unwrap_or(0.0),
            subtasks: Vec::new(),
        }
    }
}

/// A subtask row as returned by the subtask list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtaskRecord {
    pub id: RawId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_time: Option<f64>,
    /// Domain-vocabulary status string (the backend reuses the task
    /// vocabulary for subtask rows).
    pub status: String,
}

impl SubtaskRecord {
    pub fn into_subtask(self) -> Subtask {
        Subtask {
            id: self.id.into_string(),
            name: self.name,
            description: self.description,
            estimated_hours: self.estimated_time.unwrap_or(0.0).max(0.0),
            status: SubtaskStatus::from_domain_str(&self.status),
        }
    }
}

/// Parameters for the task list endpoint: acting-user identity, role, and
/// optional entity/search scoping. The server does the role-aware filtering;
/// the engine never second-guesses it locally.
#[derive(Debug, Clone)]
pub struct TaskQuery {
    pub user_id: String,
    pub role: Role,
    pub entity: EntityFilter,
    pub search: Option<String>,
    pub search_field: Option<String>,
}

fn serialize_domain_status<S>(status: &Option<TaskStatus>, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match status {
        Some(s) => ser.serialize_some(s.as_domain_str()),
        None => ser.serialize_none(),
    }
}

/// Body of a task PATCH. One request shape covers status changes,
/// reassignment, and due-date moves, matching the backend's single
/// update endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatchRequest {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_domain_status"
    )]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Response body of a task or subtask PATCH. `success == true` is the sole
/// success criterion; the server may echo normalized fields.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Normalized assignee display name, echoed after reassignment.
    #[serde(default)]
    pub assignee_name: Option<String>,
}

impl PatchOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            assignee_name: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            assignee_name: None,
        }
    }
}

/// The remote source of truth, as the engine sees it.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Fetch the task list for the acting user, optionally scoped and
    /// searched server-side.
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, BackendError>;

    /// Patch one task: status, remarks, assignee, and/or due date.
    async fn patch_task(
        &self,
        task_id: &str,
        request: &TaskPatchRequest,
    ) -> Result<PatchOutcome, BackendError>;

    /// Fetch the ordered subtask rows for one task.
    async fn list_subtasks(&self, task_id: &str) -> Result<Vec<SubtaskRecord>, BackendError>;

    /// Patch one subtask's status.
    async fn patch_subtask(
        &self,
        subtask_id: &str,
        status: SubtaskStatus,
    ) -> Result<PatchOutcome, BackendError>;

    /// Auditor list for the entity-filter dropdown.
    async fn list_auditors(&self) -> Result<Vec<EntityRef>, BackendError>;

    /// Client list for the entity-filter dropdown.
    async fn list_clients(&self) -> Result<Vec<EntityRef>, BackendError>;
}
