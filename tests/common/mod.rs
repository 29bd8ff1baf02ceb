//! Shared test fixtures: a scriptable in-memory backend.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use taskboard_engine::backend::{
    BackendError, PatchOutcome, SubtaskRecord, TaskBackend, TaskPatchRequest, TaskQuery,
    TaskRecord,
};
use taskboard_engine::status::SubtaskStatus;
use taskboard_engine::types::{Actor, EntityRef, Role};

/// Scriptable backend. Patch calls consume queued results (defaulting to
/// success) and are logged with their serialized request bodies.
#[derive(Default)]
pub struct MockBackend {
    pub tasks: Mutex<Vec<Value>>,
    pub subtasks: Mutex<HashMap<String, Vec<Value>>>,
    pub patch_results: Mutex<VecDeque<Result<PatchOutcome, BackendError>>>,
    pub patch_log: Mutex<Vec<(String, Value)>>,
    pub subtask_patch_log: Mutex<Vec<(String, SubtaskStatus)>>,
    pub fail_list: AtomicBool,
    pub seen_searches: Mutex<Vec<Option<String>>>,
    pub seen_search_fields: Mutex<Vec<Option<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Value>) -> Self {
        let backend = Self::default();
        *backend.tasks.lock().unwrap() = tasks;
        backend
    }

    pub fn queue_patch_result(&self, result: Result<PatchOutcome, BackendError>) {
        self.patch_results.lock().unwrap().push_back(result);
    }

    pub fn patched_task_ids(&self) -> Vec<String> {
        self.patch_log
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl TaskBackend for MockBackend {
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, BackendError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection refused".to_string()));
        }
        self.seen_searches
            .lock()
            .unwrap()
            .push(query.search.clone());
        self.seen_search_fields
            .lock()
            .unwrap()
            .push(query.search_field.clone());
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .map(|raw| {
                serde_json::from_value(raw.clone())
                    .map_err(|e| BackendError::InvalidResponse(e.to_string()))
            })
            .collect()
    }

    async fn patch_task(
        &self,
        task_id: &str,
        request: &TaskPatchRequest,
    ) -> Result<PatchOutcome, BackendError> {
        let body = serde_json::to_value(request)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        self.patch_log
            .lock()
            .unwrap()
            .push((task_id.to_string(), body));
        self.patch_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PatchOutcome::ok()))
    }

    async fn list_subtasks(&self, task_id: &str) -> Result<Vec<SubtaskRecord>, BackendError> {
        self.subtasks
            .lock()
            .unwrap()
            .get(task_id)
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(|raw| {
                serde_json::from_value(raw.clone())
                    .map_err(|e| BackendError::InvalidResponse(e.to_string()))
            })
            .collect()
    }

    async fn patch_subtask(
        &self,
        subtask_id: &str,
        status: SubtaskStatus,
    ) -> Result<PatchOutcome, BackendError> {
        self.subtask_patch_log
            .lock()
            .unwrap()
            .push((subtask_id.to_string(), status));
        self.patch_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PatchOutcome::ok()))
    }

    async fn list_auditors(&self) -> Result<Vec<EntityRef>, BackendError> {
        Ok(vec![
            EntityRef {
                id: "a1".to_string(),
                name: "Priya Sharma".to_string(),
            },
            EntityRef {
                id: "a2".to_string(),
                name: "Rahul Verma".to_string(),
            },
        ])
    }

    async fn list_clients(&self) -> Result<Vec<EntityRef>, BackendError> {
        Ok(vec![EntityRef {
            id: "c1".to_string(),
            name: "Acme Corp".to_string(),
        }])
    }
}

/// Wire-shaped task record for seeding the mock backend.
pub fn task_json(id: u64, name: &str, status: &str, criticality: &str) -> Value {
    json!({
        "id": id,
        "task_name": name,
        "status": status,
        "criticality": criticality,
        "customer_name": "Acme Corp",
        "assignee": "Priya Sharma",
        "time_taken": 0.0
    })
}

pub fn admin() -> Actor {
    Actor {
        id: "u-admin".to_string(),
        name: "Admin".to_string(),
        role: Role::Admin,
    }
}

pub fn auditor() -> Actor {
    Actor {
        id: "u-auditor".to_string(),
        name: "Auditor".to_string(),
        role: Role::Auditor,
    }
}
