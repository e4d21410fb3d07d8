//! Worker CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::engine::{TaskSource, WorkerSource};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum WorkerCommands {
    /// Register a worker
    Add {
        /// Display name
        name: String,
    },

    /// List workers
    List,

    /// Show how many tasks each worker holds
    Stats,
}

pub fn run(cmd: WorkerCommands, output: &Output) -> Result<()> {
    match cmd {
        WorkerCommands::Add { name } => add_worker(output, &name),
        WorkerCommands::List => list_workers(output),
        WorkerCommands::Stats => stats(output),
    }
}

fn add_worker(output: &Output, name: &str) -> Result<()> {
    let project = Project::open_current()?;
    let worker = project.add_worker(name)?;

    if output.is_json() {
        output.data(&worker);
    } else {
        output.success(&format!("Added worker: {} - {}", worker.id, worker.name));
    }

    Ok(())
}

fn list_workers(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let workers = project.workers()?;

    if output.is_json() {
        output.data(&workers);
    } else if workers.is_empty() {
        println!("No workers found");
    } else {
        for worker in &workers {
            output.row(&[worker.id.to_string().as_str(), worker.name.as_str()]);
        }
    }

    Ok(())
}

fn stats(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let orchestrator = project.orchestrator()?;
    let loads = orchestrator.workload(&project.tasks()?, &project.workers()?);

    if output.is_json() {
        output.data(&loads);
    } else if loads.is_empty() {
        println!("No workers found");
    } else {
        println!("{:<8} {:<6} NAME", "ID", "TASKS");
        for worker in &loads {
            println!("{:<8} {:<6} {}", worker.id.to_string(), worker.load, worker.name);
        }
    }

    Ok(())
}
