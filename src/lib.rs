//! crewplan - dependency-aware task scheduling for small teams
//!
//! Tracks tasks and the dependencies between them, ranks open work by
//! urgency and hands it out to workers under a chosen allocation strategy.

pub mod domain;
pub mod engine;
pub mod storage;
pub mod logging;
pub mod cli;

pub use domain::{DependencyGraph, TaskId, TaskRef, TaskStatus, Worker, WorkerId};
pub use engine::{AssignmentPlan, EngineError, SchedulingOrchestrator, Strategy};
