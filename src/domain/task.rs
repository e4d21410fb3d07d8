//! Task and worker domain models
//!
//! Tasks are the units of work the scheduler ranks and distributes.
//! Workers are the assignee candidates; their load is derived per
//! scheduling run from the task snapshot and never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::{TaskId, WorkerId};

/// Most urgent rank
pub const MOST_URGENT: u8 = 1;

/// Least urgent rank
pub const LEAST_URGENT: u8 = 5;

/// Rank given to tasks created without an explicit urgency
pub const DEFAULT_URGENCY: u8 = 3;

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Returns true if this task is not yet started
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// A task as seen by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Urgency rank, 1 (most urgent) to 5
    pub urgency: u8,

    /// Date the task is due
    pub deadline: NaiveDate,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Worker the task is assigned to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<WorkerId>,
}

impl TaskRef {
    /// Creates a pending, unassigned task
    pub fn new(id: TaskId, title: impl Into<String>, urgency: u8, deadline: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            urgency,
            deadline,
            status: TaskStatus::Pending,
            assigned_to: None,
        }
    }

    /// Returns true if the task is pending and nobody owns it yet
    pub fn is_assignable(&self) -> bool {
        self.status.is_pending() && self.assigned_to.is_none()
    }

    /// Returns true if the task is assigned to `worker`
    pub fn is_assigned_to(&self, worker: WorkerId) -> bool {
        self.assigned_to == Some(worker)
    }

    /// Assigns the task to a worker
    pub fn assign(&mut self, worker: WorkerId) {
        self.assigned_to = Some(worker);
    }

    /// Marks the task as in progress
    pub fn start(&mut self) {
        self.status = TaskStatus::InProgress;
    }

    /// Marks the task as completed
    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
    }

    /// Days from `today` until the deadline; negative once overdue
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// Returns true if the deadline is before `today` and the task is open
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_complete() && self.days_left(today) < 0
    }
}

/// A worker record as kept by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
}

impl Worker {
    pub fn new(id: WorkerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A worker together with its task load for one scheduling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerRef {
    pub id: WorkerId,
    pub name: String,
    /// Tasks assigned to this worker, whatever their status
    pub load: usize,
}

impl WorkerRef {
    /// Builds the load view for `worker` from a task snapshot
    pub fn from_snapshot(worker: &Worker, tasks: &[TaskRef]) -> Self {
        let load = tasks.iter().filter(|t| t.is_assigned_to(worker.id)).count();
        Self {
            id: worker.id,
            name: worker.name.clone(),
            load,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_task(id: u32) -> TaskRef {
        TaskRef::new(TaskId::new(id), format!("Task {}", id), 2, date(2026, 3, 10))
    }

    #[test]
    fn new_task_is_assignable() {
        let task = make_task(1);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.assigned_to.is_none());
        assert!(task.is_assignable());
    }

    #[test]
    fn assigned_or_started_tasks_are_not_assignable() {
        let mut assigned = make_task(1);
        assigned.assign(WorkerId::new(4));
        assert!(!assigned.is_assignable());
        assert!(assigned.is_assigned_to(WorkerId::new(4)));

        let mut started = make_task(2);
        started.start();
        assert!(!started.is_assignable());
    }

    #[test]
    fn days_left_counts_calendar_days() {
        let task = make_task(1);
        assert_eq!(task.days_left(date(2026, 3, 1)), 9);
        assert_eq!(task.days_left(date(2026, 3, 10)), 0);
        assert_eq!(task.days_left(date(2026, 3, 12)), -2);
    }

    #[test]
    fn overdue_ignores_completed_tasks() {
        let mut task = make_task(1);
        assert!(task.is_overdue(date(2026, 4, 1)));
        task.complete();
        assert!(!task.is_overdue(date(2026, 4, 1)));
    }

    #[test]
    fn worker_load_counts_any_status() {
        let worker = Worker::new(WorkerId::new(1), "Ada");
        let mut a = make_task(1);
        a.assign(worker.id);
        let mut b = make_task(2);
        b.assign(worker.id);
        b.complete();
        let c = make_task(3);

        let view = WorkerRef::from_snapshot(&worker, &[a, b, c]);
        assert_eq!(view.load, 2);
        assert_eq!(view.name, "Ada");
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn task_json_shape() {
        let task = make_task(7);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "t-7");
        assert_eq!(json["deadline"], "2026-03-10");
        assert_eq!(json["status"], "pending");
        assert!(json.get("assigned_to").is_none());
    }
}
