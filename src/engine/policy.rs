//! Assignment policies
//!
//! A policy maps an ordered list of candidate tasks onto workers, given
//! each worker's load at the start of the run. Policies hold no state
//! between runs: the rotation queue and load table are rebuilt on every
//! call, so the same snapshot always yields the same assignments.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::StructureError;
use super::rotation::AllocationQueue;
use crate::domain::{TaskId, TaskRef, WorkerId, WorkerRef};

/// Named allocation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Strategy {
    /// Cycle through workers in the order given
    #[default]
    RoundRobin,
    /// Always pick the worker with the fewest open tasks
    LeastWorkload,
    /// Reserved for role matching; currently assigns exactly like round robin
    SkillMatch,
}

impl Strategy {
    /// Parses a strategy name, returning `None` if it is not recognized
    ///
    /// Matching ignores case and treats `-` like `_`. The older
    /// `by_workload` / `by_skill_match` spellings are accepted too.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "ROUND_ROBIN" | "ROUNDROBIN" => Some(Strategy::RoundRobin),
            "LEAST_WORKLOAD" | "BY_WORKLOAD" | "WORKLOAD" => Some(Strategy::LeastWorkload),
            "SKILL_MATCH" | "BY_SKILL_MATCH" => Some(Strategy::SkillMatch),
            _ => None,
        }
    }

    /// Parses a strategy name, falling back to round robin
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            warn!(strategy = %name, "unrecognized strategy, using round_robin");
            Strategy::RoundRobin
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RoundRobin => "round_robin",
            Strategy::LeastWorkload => "least_workload",
            Strategy::SkillMatch => "skill_match",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Strategy {
    fn from(name: &str) -> Self {
        Self::parse_or_default(name)
    }
}

impl From<String> for Strategy {
    fn from(name: String) -> Self {
        Self::parse_or_default(&name)
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// One proposed (task -> worker) pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub task: TaskId,
    pub worker: WorkerId,
}

impl Assignment {
    pub fn new(task: TaskId, worker: WorkerId) -> Self {
        Self { task, worker }
    }
}

/// Chooses a worker for each task
pub trait AssignmentPolicy {
    /// The strategy this policy implements
    fn strategy(&self) -> Strategy;

    /// Assigns every task, in order, to one of `workers`
    ///
    /// Returns no assignments when `workers` is empty.
    fn assign(
        &self,
        tasks: &[TaskRef],
        workers: &[WorkerRef],
    ) -> Result<Vec<Assignment>, StructureError>;
}

/// Builds the policy for `strategy`
///
/// `queue_capacity` bounds the rotation queue used by the round-robin
/// based policies.
pub fn policy_for(strategy: Strategy, queue_capacity: usize) -> Box<dyn AssignmentPolicy> {
    match strategy {
        Strategy::RoundRobin => Box::new(RoundRobin::new(queue_capacity)),
        Strategy::LeastWorkload => Box::new(LeastWorkload),
        Strategy::SkillMatch => Box::new(SkillMatch::new(queue_capacity)),
    }
}

/// Rotates through workers with an [`AllocationQueue`]
///
/// Each task takes the worker at the head of the queue, which then goes
/// back to the tail. Over N tasks and W workers everyone receives
/// either ⌊N/W⌋ or ⌈N/W⌋ tasks. Current loads are ignored.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    queue_capacity: usize,
}

impl RoundRobin {
    pub fn new(queue_capacity: usize) -> Self {
        Self { queue_capacity }
    }
}

impl AssignmentPolicy for RoundRobin {
    fn strategy(&self) -> Strategy {
        Strategy::RoundRobin
    }

    fn assign(
        &self,
        tasks: &[TaskRef],
        workers: &[WorkerRef],
    ) -> Result<Vec<Assignment>, StructureError> {
        if workers.is_empty() {
            return Ok(Vec::new());
        }

        let mut queue = AllocationQueue::with_capacity(self.queue_capacity);
        for worker in workers {
            queue.enqueue(worker.id)?;
        }

        let mut assignments = Vec::with_capacity(tasks.len());
        for task in tasks {
            let worker = *queue.rotate()?;
            debug!(task = %task.id, %worker, "round robin pick");
            assignments.push(Assignment::new(task.id, worker));
        }

        Ok(assignments)
    }
}

/// Gives each task to the currently least-loaded worker
///
/// Keeps (worker, load) entries sorted by load and re-sorts after every
/// pick, which costs O(n·m log m) for n tasks and m workers. Fine for team
/// sized inputs. Equal loads go to the worker listed first.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastWorkload;

#[derive(Debug)]
struct LoadEntry {
    worker: WorkerId,
    load: usize,
    position: usize,
}

impl AssignmentPolicy for LeastWorkload {
    fn strategy(&self) -> Strategy {
        Strategy::LeastWorkload
    }

    fn assign(
        &self,
        tasks: &[TaskRef],
        workers: &[WorkerRef],
    ) -> Result<Vec<Assignment>, StructureError> {
        let mut loads: Vec<LoadEntry> = workers
            .iter()
            .enumerate()
            .map(|(position, w)| LoadEntry {
                worker: w.id,
                load: w.load,
                position,
            })
            .collect();
        loads.sort_by_key(|entry| (entry.load, entry.position));

        let mut assignments = Vec::with_capacity(tasks.len());
        for task in tasks {
            let Some(lightest) = loads.first_mut() else {
                break;
            };

            lightest.load += 1;
            debug!(task = %task.id, worker = %lightest.worker, load = lightest.load, "least workload pick");
            assignments.push(Assignment::new(task.id, lightest.worker));

            loads.sort_by_key(|entry| (entry.load, entry.position));
        }

        Ok(assignments)
    }
}

/// Placeholder for role-aware matching
///
/// Tasks and workers carry no role information yet, so this hands every
/// call to [`RoundRobin`] and produces identical output.
#[derive(Debug, Clone)]
pub struct SkillMatch {
    fallback: RoundRobin,
}

impl SkillMatch {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            fallback: RoundRobin::new(queue_capacity),
        }
    }
}

impl AssignmentPolicy for SkillMatch {
    fn strategy(&self) -> Strategy {
        Strategy::SkillMatch
    }

    fn assign(
        &self,
        tasks: &[TaskRef],
        workers: &[WorkerRef],
    ) -> Result<Vec<Assignment>, StructureError> {
        self.fallback.assign(tasks, workers)
    }
}
