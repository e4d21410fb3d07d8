//! Scheduling engine
//!
//! Bounded ranking and rotation structures, the assignment policies built
//! on them, and the orchestrator that drives a scheduling run.

mod error;
mod orchestrator;
mod policy;
mod ranker;
mod rotation;
mod source;

pub use error::{EngineError, Result, StructureError};
pub use orchestrator::{
    AssignmentPlan, AssignmentRequest, EngineConfig, SchedulingOrchestrator, NO_VALID_WORKERS,
};
pub use policy::{
    policy_for, Assignment, AssignmentPolicy, LeastWorkload, RoundRobin, SkillMatch, Strategy,
};
pub use ranker::{Ranked, UrgencyRanker};
pub use rotation::AllocationQueue;
pub use source::{apply_plan, TaskSource, WorkerSource};
