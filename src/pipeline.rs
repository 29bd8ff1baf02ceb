//! Filter/sort pipeline.
//!
//! A pure function from the task set and the full filter/sort state to the
//! ordered, filtered view. The result is the sole input to pagination;
//! pagination never filters independently. Callers re-run the pipeline
//! whenever the task set, any filter value, the sort mode, or the search
//! term changes.

use crate::status::TaskStatus;
use crate::types::{Criticality, Task};
use chrono::{Datelike, Months, NaiveDate};

/// Which fields the free-text search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    TaskName,
    ClientName,
    AssigneeName,
    /// Match any of the three.
    #[default]
    Any,
}

impl SearchScope {
    /// Wire name of the scoped column for server-side search; `None` when
    /// the scope matches any field.
    pub fn wire_field(&self) -> Option<&'static str> {
        match self {
            SearchScope::TaskName => Some("task_name"),
            SearchScope::ClientName => Some("customer_name"),
            SearchScope::AssigneeName => Some("assignee"),
            SearchScope::Any => None,
        }
    }
}

/// Due-month bucketing. Tasks with no due date pass every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthBucket {
    #[default]
    All,
    Current,
    Previous,
    Next,
    LastThree,
}

impl MonthBucket {
    /// Whether a due date falls in this bucket, relative to `today`.
    fn contains(&self, due: NaiveDate, today: NaiveDate) -> bool {
        let same_month =
            |a: NaiveDate, b: NaiveDate| a.year() == b.year() && a.month() == b.month();
        match self {
            MonthBucket::All => true,
            MonthBucket::Current => same_month(due, today),
            // Month arithmetic through chrono handles the year boundary
            // (January's previous month is last December, etc.)
            MonthBucket::Previous => match today.checked_sub_months(Months::new(1)) {
                Some(prev) => same_month(due, prev),
                None => false,
            },
            MonthBucket::Next => match today.checked_add_months(Months::new(1)) {
                Some(next) => same_month(due, next),
                None => false,
            },
            MonthBucket::LastThree => match today.checked_sub_months(Months::new(3)) {
                Some(cutoff) => due >= cutoff,
                None => true,
            },
        }
    }
}

/// Sort order for the filtered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// No explicit sort: most-recently-assigned first; records without an
    /// assigned timestamp are treated as equal and retain source order.
    #[default]
    None,
    /// High before Medium before Low, ties in source order.
    CriticalityDesc,
    /// Low before Medium before High, ties in source order.
    CriticalityAsc,
}

/// Transient, UI-scoped filter state. Not persisted; reset wholesale when
/// the viewed entity changes.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub query: String,
    pub scope: SearchScope,
    pub month: MonthBucket,
    pub status: Option<TaskStatus>,
    pub criticality: Option<Criticality>,
    pub sort: SortMode,
}

impl FilterState {
    /// Reset every field to its default (used when the viewed entity
    /// changes).
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }
}

/// A task is included iff all active predicates pass.
fn matches(task: &Task, filter: &FilterState, today: NaiveDate) -> bool {
    if let Some(status) = filter.status
        && task.status != status
    {
        return false;
    }

    if let Some(criticality) = filter.criticality
        && task.criticality != criticality
    {
        return false;
    }

    // No due date passes every month bucket
    if let Some(due) = task.due_date
        && !filter.month.contains(due, today)
    {
        return false;
    }

    if !filter.query.is_empty() {
        let needle = filter.query.to_lowercase();
        let contains = |field: Option<&str>| {
            field
                .map(|f| f.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };
        let hit = match filter.scope {
            SearchScope::TaskName => contains(Some(&task.name)),
            SearchScope::ClientName => contains(task.client_name.as_deref()),
            SearchScope::AssigneeName => contains(task.assignee_name.as_deref()),
            SearchScope::Any => {
                contains(Some(&task.name))
                    || contains(task.client_name.as_deref())
                    || contains(task.assignee_name.as_deref())
            }
        };
        if !hit {
            return false;
        }
    }

    true
}

/// Run the full pipeline: AND of all active predicates, then a stable sort
/// per the configured mode.
pub fn apply<'a>(tasks: &'a [Task], filter: &FilterState, today: NaiveDate) -> Vec<&'a Task> {
    let mut result: Vec<&Task> = tasks
        .iter()
        .filter(|task| matches(task, filter, today))
        .collect();

    match filter.sort {
        SortMode::CriticalityDesc => {
            result.sort_by(|a, b| b.criticality.cmp(&a.criticality));
        }
        SortMode::CriticalityAsc => {
            result.sort_by(|a, b| a.criticality.cmp(&b.criticality));
        }
        SortMode::None => {
            // Most-recently-assigned first. Records without a timestamp
            // compare equal to each other and retain source order at the
            // tail (None < Some under Option's ordering).
            result.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn task(id: &str, status: TaskStatus, criticality: Criticality) -> Task {
        Task {
            id: id.to_string(),
            name: format!("Task {}", id),
            client_id: None,
            client_name: None,
            assignee_id: None,
            assignee_name: None,
            status,
            due_date: None,
            criticality,
            remarks: None,
            assigned_at: None,
            time_taken: 0.0,
            subtasks: Vec::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn search_scopes_map_to_their_wire_columns() {
        assert_eq!(SearchScope::TaskName.wire_field(), Some("task_name"));
        assert_eq!(SearchScope::ClientName.wire_field(), Some("customer_name"));
        assert_eq!(SearchScope::AssigneeName.wire_field(), Some("assignee"));
        assert_eq!(SearchScope::Any.wire_field(), None);
    }

    #[test]
    fn status_filter_selects_matching_tasks_only() {
        let tasks = vec![
            task("1", TaskStatus::Todo, Criticality::High),
            task("2", TaskStatus::InProgress, Criticality::Low),
        ];
        let filter = FilterState {
            status: Some(TaskStatus::Todo),
            ..Default::default()
        };

        let result = apply(&tasks, &filter, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn predicates_combine_with_logical_and() {
        let mut a = task("1", TaskStatus::Todo, Criticality::High);
        a.client_name = Some("Acme Corp".to_string());
        let mut b = task("2", TaskStatus::Todo, Criticality::Low);
        b.client_name = Some("Acme Corp".to_string());

        let tasks = vec![a, b];
        let filter = FilterState {
            query: "acme".to_string(),
            scope: SearchScope::ClientName,
            criticality: Some(Criticality::High),
            ..Default::default()
        };

        let result = apply(&tasks, &filter, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn search_is_case_insensitive_and_scoped() {
        let mut t = task("1", TaskStatus::Todo, Criticality::Low);
        t.assignee_name = Some("Priya Sharma".to_string());
        let tasks = vec![t];

        let mut filter = FilterState {
            query: "PRIYA".to_string(),
            scope: SearchScope::AssigneeName,
            ..Default::default()
        };
        assert_eq!(apply(&tasks, &filter, today()).len(), 1);

        // Same query scoped to task name finds nothing
        filter.scope = SearchScope::TaskName;
        assert!(apply(&tasks, &filter, today()).is_empty());
    }

    #[test]
    fn tasks_without_due_date_pass_every_month_bucket() {
        let tasks = vec![task("1", TaskStatus::Todo, Criticality::Low)];
        for month in [
            MonthBucket::All,
            MonthBucket::Current,
            MonthBucket::Previous,
            MonthBucket::Next,
            MonthBucket::LastThree,
        ] {
            let filter = FilterState {
                month,
                ..Default::default()
            };
            assert_eq!(apply(&tasks, &filter, today()).len(), 1);
        }
    }

    #[test]
    fn month_buckets_wrap_the_year_boundary() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut dec_task = task("1", TaskStatus::Todo, Criticality::Low);
        dec_task.due_date = Some(NaiveDate::from_ymd_opt(2024, 12, 20).unwrap());
        let mut feb_task = task("2", TaskStatus::Todo, Criticality::Low);
        feb_task.due_date = Some(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
        let tasks = vec![dec_task, feb_task];

        let prev = FilterState {
            month: MonthBucket::Previous,
            ..Default::default()
        };
        let result = apply(&tasks, &prev, jan);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");

        let next = FilterState {
            month: MonthBucket::Next,
            ..Default::default()
        };
        let result = apply(&tasks, &next, jan);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "2");
    }

    #[test]
    fn criticality_sort_is_stable() {
        let tasks = vec![
            task("1", TaskStatus::Todo, Criticality::Low),
            task("2", TaskStatus::Todo, Criticality::High),
            task("3", TaskStatus::Todo, Criticality::Low),
            task("4", TaskStatus::Todo, Criticality::High),
        ];
        let filter = FilterState {
            sort: SortMode::CriticalityDesc,
            ..Default::default()
        };

        let ids: Vec<&str> = apply(&tasks, &filter, today())
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn default_order_is_most_recently_assigned_first() {
        let at = |h| Utc.with_ymd_and_hms(2025, 6, 14, h, 0, 0).unwrap();
        let mut a = task("1", TaskStatus::Todo, Criticality::Low);
        a.assigned_at = Some(at(8));
        let mut b = task("2", TaskStatus::Todo, Criticality::Low);
        b.assigned_at = Some(at(12));
        let c = task("3", TaskStatus::Todo, Criticality::Low);
        let tasks = vec![a, b, c];

        let ids: Vec<&str> = apply(&tasks, &FilterState::default(), today())
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        // Timestamped tasks sort newest-first; untimestamped records keep
        // source order after them.
        assert_eq!(ids, vec!["2", "1", "3"]);
    }
}
