//! # Storage Layer
//!
//! Persistence for crewplan in plain, diffable files.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.crewplan/tasks.jsonl` |
//! | Workers | JSONL | `.crewplan/workers.jsonl` |
//! | Dependencies | JSONL, in insertion order | `.crewplan/dependencies.jsonl` |
//! | Config | TOML | `.crewplan/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - Every [`JsonlStore`] takes `fs2` file locks (shared to read, exclusive to write)
//! - Full rewrites are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for a crewplan project; implements the
//!   engine's task and worker sources
//! - [`JsonlStore`] - Read/write records as JSONL
//! - [`Config`] - Project and global configuration

mod config;
mod jsonl;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use jsonl::{DependencyStore, JsonlStore, Keyed, TaskStore, WorkerStore};
pub use project::{Project, ProjectError};
