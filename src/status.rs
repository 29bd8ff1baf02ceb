//! Status vocabulary codecs.
//!
//! The backend speaks one four-word vocabulary (`Yet to Start`, `WIP`,
//! `Pending`, `Completed`), the UI layer another (`todo`, `in-progress`,
//! `pending`, `completed`). Internal logic uses the tagged enums in this
//! module exclusively; the raw strings exist only at the wire and render
//! boundaries. Decoding is total: an unrecognized status from upstream is
//! logged and defaulted rather than rejected, because upstream data is not
//! guaranteed to be validated.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Task status in the internal (view) vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Pending,
    Completed,
}

impl TaskStatus {
    /// All four statuses in board-lane order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Pending,
        TaskStatus::Completed,
    ];

    /// View-vocabulary string, as used for lane ids and render classes.
    pub fn as_view_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Domain-vocabulary string, as sent to and received from the backend.
    pub fn as_domain_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Yet to Start",
            TaskStatus::InProgress => "WIP",
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Decode a view-vocabulary string. Unknown values log and default to
    /// `Todo`.
    pub fn from_view_str(s: &str) -> Self {
        match s {
            "todo" => TaskStatus::Todo,
            "in-progress" => TaskStatus::InProgress,
            "pending" => TaskStatus::Pending,
            "completed" => TaskStatus::Completed,
            other => {
                warn!(status = other, "unknown view status, defaulting to todo");
                TaskStatus::Todo
            }
        }
    }

    /// Decode a domain-vocabulary string. Unknown values log and default to
    /// `Todo` (`Yet to Start`).
    pub fn from_domain_str(s: &str) -> Self {
        match s {
            "Yet to Start" => TaskStatus::Todo,
            "WIP" => TaskStatus::InProgress,
            "Pending" => TaskStatus::Pending,
            "Completed" => TaskStatus::Completed,
            other => {
                warn!(
                    status = other,
                    "unknown domain status, defaulting to Yet to Start"
                );
                TaskStatus::Todo
            }
        }
    }
}

/// Subtask status. Restricted set: subtasks only ever move forward through
/// not-started, in-progress, completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl SubtaskStatus {
    /// Domain-vocabulary string. The backend reuses the task vocabulary for
    /// subtask rows.
    pub fn as_domain_str(&self) -> &'static str {
        match self {
            SubtaskStatus::NotStarted => "Yet to Start",
            SubtaskStatus::InProgress => "WIP",
            SubtaskStatus::Completed => "Completed",
        }
    }

    /// Decode a domain-vocabulary string, defaulting unknowns to
    /// `NotStarted` with a warning.
    pub fn from_domain_str(s: &str) -> Self {
        match s {
            "Yet to Start" => SubtaskStatus::NotStarted,
            "WIP" => SubtaskStatus::InProgress,
            "Completed" => SubtaskStatus::Completed,
            other => {
                warn!(
                    status = other,
                    "unknown subtask status, defaulting to not-started"
                );
                SubtaskStatus::NotStarted
            }
        }
    }
}
