//! Drag-and-drop status transitions.
//!
//! A drag gesture that ends over a status lane is just another way of
//! requesting a status transition: it routes through the same optimistic
//! mutation path as the dropdown, so the Pending-requires-remarks deferral
//! and the completed-is-terminal rule apply identically. A drop into the
//! Pending lane therefore comes back as `RemarksRequired`; the UI collects
//! remarks and replays the drop with them attached. No task reaches
//! `Pending` without remarks through either input path.

use crate::error::EngineResult;
use crate::mutator::{MutationOutcome, OptimisticMutator};
use crate::status::TaskStatus;
use crate::types::Actor;
use std::sync::Arc;
use tracing::debug;

/// How a completed drag gesture resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The drag ended with no valid drop target; nothing happened.
    Ignored,
    /// The drop was interpreted as a status transition.
    Mutation(MutationOutcome),
}

/// Interprets drag gestures against the board's status lanes.
pub struct DragDropCoordinator {
    mutator: Arc<OptimisticMutator>,
}

impl DragDropCoordinator {
    pub fn new(mutator: Arc<OptimisticMutator>) -> Self {
        Self { mutator }
    }

    /// Handle the end of a drag gesture. `target` is the lane the task was
    /// dropped over, if any; `remarks` carries the prompt text when
    /// replaying a Pending drop.
    pub async fn drag_end(
        &self,
        actor: &Actor,
        task_id: &str,
        target: Option<TaskStatus>,
        remarks: Option<String>,
    ) -> EngineResult<DragOutcome> {
        let Some(lane) = target else {
            debug!(task_id, "drag ended without a drop target");
            return Ok(DragOutcome::Ignored);
        };

        let outcome = self
            .mutator
            .change_status(actor, task_id, lane, remarks)
            .await?;
        Ok(DragOutcome::Mutation(outcome))
    }
}
