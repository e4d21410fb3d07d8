//! Where the engine gets its snapshots from
//!
//! The engine works on plain slices; these traits are the seam between it
//! and whatever keeps tasks and workers. `storage::Project` implements
//! both over JSONL files.

use anyhow::{Context, Result};
use tracing::info;

use super::orchestrator::AssignmentPlan;
use super::policy::Assignment;
use crate::domain::{TaskId, TaskRef, Worker, WorkerId};

/// Provides the task snapshot and persists assignments
pub trait TaskSource {
    /// Returns every known task
    fn tasks(&self) -> Result<Vec<TaskRef>>;

    /// Records that `task` is now owned by `worker`
    fn assign(&mut self, task: TaskId, worker: WorkerId) -> Result<()>;

    /// Records a batch of assignments, returning how many were saved
    ///
    /// The default saves them one at a time and stops at the first failure;
    /// the assignments before it stay saved and the error says how many.
    /// Stores that can write a batch in one step should override this so a
    /// failure leaves nothing behind.
    fn assign_all(&mut self, assignments: &[Assignment]) -> Result<usize> {
        for (saved, assignment) in assignments.iter().enumerate() {
            self.assign(assignment.task, assignment.worker).with_context(|| {
                format!(
                    "Saved {} of {} assignments before {} failed",
                    saved,
                    assignments.len(),
                    assignment.task
                )
            })?;
        }
        Ok(assignments.len())
    }
}

/// Provides the worker roster
pub trait WorkerSource {
    /// Returns every known worker
    fn workers(&self) -> Result<Vec<Worker>>;
}

/// Writes every assignment in `plan` to `source`, returning how many were
/// written
pub fn apply_plan<S: TaskSource + ?Sized>(source: &mut S, plan: &AssignmentPlan) -> Result<usize> {
    let applied = source.assign_all(&plan.assignments)?;
    info!(applied, "assignment plan applied");
    Ok(applied)
}
