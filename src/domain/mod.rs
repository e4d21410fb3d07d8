//! Domain models for crewplan
//!
//! Contains the task/worker records and the dependency graph, without any
//! I/O concerns.

mod id;
mod task;
mod graph;

pub use id::{IdError, TaskId, WorkerId};
pub use task::{TaskRef, TaskStatus, Worker, WorkerRef, DEFAULT_URGENCY, LEAST_URGENT, MOST_URGENT};
pub use graph::{DependencyGraph, Edge, GraphError};
