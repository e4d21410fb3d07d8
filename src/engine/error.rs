//! Error types for the scheduling engine

use thiserror::Error;

use crate::domain::{GraphError, TaskId};

/// Violations of a fixed-capacity structure's bounds
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("{structure} is full (capacity {capacity})")]
    CapacityExceeded {
        structure: &'static str,
        capacity: usize,
    },

    #[error("{0} is empty")]
    Empty(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
}

impl EngineError {
    /// Returns true if the error is a rejected cyclic dependency
    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            EngineError::Graph(GraphError::CycleDetected(_, _) | GraphError::Cyclic)
        )
    }

    /// Returns true if the error names an unknown task
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::TaskNotFound(_) | EngineError::Graph(GraphError::TaskNotFound(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
