//! Identifiers for tasks and workers
//!
//! ID Format:
//! - Task IDs: `t-{n}` (e.g., `t-12`)
//! - Worker IDs: `w-{n}` (e.g., `w-3`)
//!
//! Both parse from either the prefixed form or the bare number, so `12` and
//! `t-12` name the same task. Ordering follows the numeric value, which is
//! what the scheduler uses for deterministic tie-breaking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{n}}' or '{{n}}', got '{0}'")]
    InvalidTaskId(String),

    #[error("Invalid worker ID format: expected 'w-{{n}}' or '{{n}}', got '{0}'")]
    InvalidWorkerId(String),
}

/// Parses `{prefix}-{n}` or a bare `{n}`
fn parse_numeric(s: &str, prefix: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(s);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// Task ID in the format `t-{n}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(u32);

impl TaskId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric portion of the ID
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns the ID that follows this one, or `None` past `u32::MAX`
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numeric(s, "t")
            .map(Self)
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

/// Worker ID in the format `w-{n}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkerId(u32);

impl WorkerId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric portion of the ID
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns the ID that follows this one, or `None` past `u32::MAX`
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w-{}", self.0)
    }
}

impl FromStr for WorkerId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numeric(s, "w")
            .map(Self)
            .ok_or_else(|| IdError::InvalidWorkerId(s.to_string()))
    }
}

impl TryFrom<String> for WorkerId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<WorkerId> for String {
    fn from(id: WorkerId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_display() {
        assert_eq!(TaskId::new(12).to_string(), "t-12");
    }

    #[test]
    fn task_id_parses_prefixed_and_bare() {
        assert_eq!("t-12".parse::<TaskId>().unwrap(), TaskId::new(12));
        assert_eq!("12".parse::<TaskId>().unwrap(), TaskId::new(12));
        assert_eq!("  t-4 ".parse::<TaskId>().unwrap(), TaskId::new(4));
    }

    #[test]
    fn task_id_rejects_garbage() {
        assert!(matches!("t-".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("w-3".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("t-1a".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("-1".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
    }

    #[test]
    fn worker_id_roundtrip() {
        let id: WorkerId = "w-7".parse().unwrap();
        assert_eq!(id.value(), 7);
        assert_eq!(id.to_string(), "w-7");
        assert!("t-7".parse::<WorkerId>().is_err());
    }

    #[test]
    fn ordering_is_numeric() {
        let mut ids = vec![TaskId::new(10), TaskId::new(2), TaskId::new(33)];
        ids.sort();
        assert_eq!(ids, vec![TaskId::new(2), TaskId::new(10), TaskId::new(33)]);
    }

    #[test]
    fn serde_uses_prefixed_strings() {
        let json = serde_json::to_string(&TaskId::new(5)).unwrap();
        assert_eq!(json, "\"t-5\"");

        let parsed: WorkerId = serde_json::from_str("\"w-9\"").unwrap();
        assert_eq!(parsed, WorkerId::new(9));

        let bad: Result<TaskId, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn next_increments() {
        assert_eq!(TaskId::new(1).next(), Some(TaskId::new(2)));
        assert_eq!(WorkerId::new(8).next(), Some(WorkerId::new(9)));
    }

    #[test]
    fn next_stops_at_the_last_id() {
        assert_eq!(TaskId::new(u32::MAX).next(), None);
        assert_eq!(WorkerId::new(u32::MAX).next(), None);
    }
}
