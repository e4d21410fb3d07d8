//! Scheduling orchestrator
//!
//! Owns the dependency graph and runs the ranking and assignment pipeline
//! over a snapshot of tasks and workers. It only ever reads the snapshot;
//! persisting a plan is the caller's job (see [`super::source::apply_plan`]).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{EngineError, Result};
use super::policy::{policy_for, Assignment, Strategy};
use super::ranker::UrgencyRanker;
use crate::domain::{DependencyGraph, GraphError, TaskId, TaskRef, Worker, WorkerId, WorkerRef};

/// Message used when none of the requested workers exist
pub const NO_VALID_WORKERS: &str = "No valid workers selected";

/// Tunables for the engine, read from the `[engine]` config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum size of the urgency ranker; it grows to fit every open task
    pub ranker_capacity: usize,

    /// Maximum number of workers in a rotation
    pub rotation_capacity: usize,

    /// Default `k` for the top-urgent view
    pub top_k: usize,

    /// Strategy used when a request doesn't name one
    pub default_strategy: Strategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ranker_capacity: 100,
            rotation_capacity: 100,
            top_k: 5,
            default_strategy: Strategy::RoundRobin,
        }
    }
}

/// Parameters for one assignment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub strategy: Strategy,
    /// Candidate workers, in rotation order
    pub workers: Vec<WorkerId>,
    /// Maximum number of tasks to assign; `None` or `Some(0)` means all
    pub limit: Option<usize>,
}

impl AssignmentRequest {
    pub fn new(strategy: Strategy, workers: Vec<WorkerId>) -> Self {
        Self {
            strategy,
            workers,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome of an assignment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentPlan {
    pub success: bool,
    pub strategy: Strategy,
    pub assigned_count: usize,
    /// New assignments per selected worker, including workers that got none
    pub per_worker: BTreeMap<WorkerId, usize>,
    /// Assignments in ranking order
    pub assignments: Vec<Assignment>,
    pub message: String,
}

impl AssignmentPlan {
    fn soft_fail(strategy: Strategy, message: impl Into<String>) -> Self {
        Self {
            success: false,
            strategy,
            assigned_count: 0,
            per_worker: BTreeMap::new(),
            assignments: Vec::new(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchedulingOrchestrator {
    graph: DependencyGraph,
    config: EngineConfig,
}

impl SchedulingOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_graph(DependencyGraph::new(), config)
    }

    pub fn with_graph(graph: DependencyGraph, config: EngineConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Adds a task as a vertex in the dependency graph
    pub fn register_task(&mut self, task: TaskId) {
        self.graph.add_task(task);
    }

    /// Removes a task and every edge touching it
    pub fn forget_task(&mut self, task: TaskId) -> bool {
        self.graph.remove_task(task)
    }

    /// Records that `dependent` cannot start before `prerequisite`
    ///
    /// On a cycle the graph is left exactly as it was.
    pub fn add_dependency(&mut self, prerequisite: TaskId, dependent: TaskId) -> Result<()> {
        self.graph.add_edge(prerequisite, dependent)?;
        info!(%prerequisite, %dependent, "dependency added");
        Ok(())
    }

    /// Removes a dependency, returning whether it existed
    pub fn remove_dependency(&mut self, prerequisite: TaskId, dependent: TaskId) -> bool {
        let removed = self.graph.remove_edge(prerequisite, dependent);
        if removed {
            info!(%prerequisite, %dependent, "dependency removed");
        } else {
            debug!(%prerequisite, %dependent, "no such dependency");
        }
        removed
    }

    /// Returns every task in an order that respects all dependencies
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        let order = self.graph.topological_sort();
        if order.len() < self.graph.len() {
            warn!(
                ordered = order.len(),
                total = self.graph.len(),
                "topological sort came up short"
            );
            return Err(GraphError::Cyclic.into());
        }
        Ok(order)
    }

    /// Returns the longest dependency chain
    pub fn critical_path(&self) -> Result<Vec<TaskId>> {
        Ok(self.graph.critical_path()?)
    }

    /// Returns every task transitively blocked by `task`
    pub fn impact(&self, task: TaskId) -> Result<BTreeSet<TaskId>> {
        if !self.graph.contains(task) {
            return Err(EngineError::TaskNotFound(task));
        }
        Ok(self.graph.impact(task))
    }

    /// Returns up to `k` of the most urgent assignable tasks, most urgent first
    pub fn top_urgent(&self, tasks: &[TaskRef], k: usize) -> Result<Vec<TaskRef>> {
        let mut ranker = self.rank(tasks)?;
        Ok(ranker.top_k(k))
    }

    /// Returns the single most urgent assignable task, if any
    pub fn next_task(&self, tasks: &[TaskRef]) -> Result<Option<TaskRef>> {
        let ranker = self.rank(tasks)?;
        Ok(ranker.peek().ok().cloned())
    }

    /// Current load of each worker, in the order given
    pub fn workload(&self, tasks: &[TaskRef], workers: &[Worker]) -> Vec<WorkerRef> {
        workers
            .iter()
            .map(|worker| WorkerRef::from_snapshot(worker, tasks))
            .collect()
    }

    /// Plans assignments for the most urgent unassigned tasks
    ///
    /// Unknown worker ids in the request are dropped, as are repeats. If
    /// nothing is left the plan comes back with `success == false` and
    /// [`NO_VALID_WORKERS`] rather than as an error.
    pub fn plan_assignment(
        &self,
        tasks: &[TaskRef],
        workers: &[Worker],
        request: &AssignmentRequest,
    ) -> Result<AssignmentPlan> {
        let strategy = request.strategy;
        let selected = select_workers(workers, &request.workers);
        if selected.is_empty() {
            warn!(requested = request.workers.len(), "no valid workers for assignment");
            return Ok(AssignmentPlan::soft_fail(strategy, NO_VALID_WORKERS));
        }

        let mut candidates = self.rank(tasks)?.into_sorted_vec();
        if let Some(limit) = request.limit.filter(|&limit| limit > 0) {
            candidates.truncate(limit);
        }

        let loads = self.workload(tasks, &selected);
        let policy = policy_for(strategy, self.config.rotation_capacity);
        let assignments = policy.assign(&candidates, &loads)?;

        let mut per_worker: BTreeMap<WorkerId, usize> =
            selected.iter().map(|worker| (worker.id, 0)).collect();
        for assignment in &assignments {
            *per_worker.entry(assignment.worker).or_default() += 1;
        }

        let assigned_count = assignments.len();
        info!(%strategy, assigned_count, workers = selected.len(), "assignment planned");

        Ok(AssignmentPlan {
            success: true,
            strategy,
            assigned_count,
            per_worker,
            assignments,
            message: format!("{} tasks assigned successfully", assigned_count),
        })
    }

    /// Loads every assignable task into a fresh ranker sized for the snapshot
    fn rank(&self, tasks: &[TaskRef]) -> Result<UrgencyRanker<TaskRef>> {
        let candidates: Vec<&TaskRef> = tasks.iter().filter(|task| task.is_assignable()).collect();
        let capacity = self.config.ranker_capacity.max(candidates.len());
        let mut ranker = UrgencyRanker::with_capacity(capacity);
        for task in candidates {
            ranker.insert(task.clone())?;
        }
        debug!(candidates = ranker.len(), "ranked tasks");
        Ok(ranker)
    }
}

/// Resolves requested ids against known workers, keeping request order
fn select_workers(known: &[Worker], requested: &[WorkerId]) -> Vec<Worker> {
    let mut seen = BTreeSet::new();
    requested
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| {
            let found = known.iter().find(|worker| worker.id == *id);
            if found.is_none() {
                debug!(worker = %id, "skipping unknown worker");
            }
            found.cloned()
        })
        .collect()
}
