//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Task | Work items | `task add`, `task start`, `task done` |
//! | Worker | Assignees | `worker add`, `worker stats` |
//! | Graph | Dependencies | `dep add`, `order`, `critical-path`, `impact` |
//! | Schedule | Ranking and assignment | `top`, `next`, `assign` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr:
//! ```bash
//! crewplan --verbose assign --workers w-1,w-2
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod deps;
mod output;
mod schedule;
mod task;
mod worker;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
