//! Per-task subtask workflow.
//!
//! Each task carries an ordered chain of subtasks, rendered as a linear
//! flow. A subtask moves through `not-started → in-progress → completed`
//! via exactly two actions, `Start` and `Complete`; there is no revert.
//! Completion across subtasks is not forced into declared order (every row
//! exposes its controls simultaneously), but the connector between two
//! rows only renders complete once the earlier row is completed, so the
//! flow still reads sequentially.

use crate::error::{EngineError, EngineResult};
use crate::status::SubtaskStatus;
use crate::types::Subtask;

/// The two actions an assignee can take on a subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtaskAction {
    /// `not-started → in-progress`
    Start,
    /// `in-progress → completed`
    Complete,
}

impl SubtaskAction {
    /// The status this action produces from `current`, or a validation
    /// error when the action does not apply (backward or repeated moves).
    pub fn advance(&self, current: SubtaskStatus) -> EngineResult<SubtaskStatus> {
        match (self, current) {
            (SubtaskAction::Start, SubtaskStatus::NotStarted) => Ok(SubtaskStatus::InProgress),
            (SubtaskAction::Complete, SubtaskStatus::InProgress) => Ok(SubtaskStatus::Completed),
            (SubtaskAction::Start, other) => Err(EngineError::invalid_transition(
                status_name(other),
                status_name(SubtaskStatus::InProgress),
            )),
            (SubtaskAction::Complete, other) => Err(EngineError::invalid_transition(
                status_name(other),
                status_name(SubtaskStatus::Completed),
            )),
        }
    }
}

fn status_name(status: SubtaskStatus) -> &'static str {
    match status {
        SubtaskStatus::NotStarted => "not-started",
        SubtaskStatus::InProgress => "in-progress",
        SubtaskStatus::Completed => "completed",
    }
}

/// Read-only view over a task's subtask chain, answering the rendering
/// questions for the linear flow.
pub struct SubtaskFlow<'a> {
    subtasks: &'a [Subtask],
}

impl<'a> SubtaskFlow<'a> {
    pub fn new(subtasks: &'a [Subtask]) -> Self {
        Self { subtasks }
    }

    pub fn len(&self) -> usize {
        self.subtasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtasks.is_empty()
    }

    /// Whether the connector leading out of subtask `index` (toward
    /// `index + 1`) renders complete: true iff that subtask is completed.
    pub fn connector_complete(&self, index: usize) -> bool {
        self.subtasks
            .get(index)
            .is_some_and(|s| s.status == SubtaskStatus::Completed)
    }

    pub fn completed_count(&self) -> usize {
        self.subtasks
            .iter()
            .filter(|s| s.status == SubtaskStatus::Completed)
            .count()
    }

    /// True once every subtask in the chain is completed.
    pub fn all_complete(&self) -> bool {
        !self.subtasks.is_empty() && self.completed_count() == self.subtasks.len()
    }
}
