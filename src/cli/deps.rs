//! Dependency graph commands

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{TaskId, TaskRef};
use crate::engine::TaskSource;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum DepCommands {
    /// Make one task wait on another
    ///
    /// Example:
    ///   crewplan dep add t-1 t-2    # t-2 can't start before t-1
    Add {
        /// Task that must come first
        prerequisite: String,

        /// Task that waits
        dependent: String,
    },

    /// Remove a dependency
    Remove {
        /// Task that came first
        prerequisite: String,

        /// Task that waited
        dependent: String,
    },

    /// List all dependencies
    List,
}

pub fn run(cmd: DepCommands, output: &Output) -> Result<()> {
    match cmd {
        DepCommands::Add {
            prerequisite,
            dependent,
        } => add(output, &prerequisite, &dependent),
        DepCommands::Remove {
            prerequisite,
            dependent,
        } => remove(output, &prerequisite, &dependent),
        DepCommands::List => list(output),
    }
}

fn parse_pair(prerequisite: &str, dependent: &str) -> Result<(TaskId, TaskId)> {
    Ok((prerequisite.parse()?, dependent.parse()?))
}

fn titles(project: &Project) -> Result<BTreeMap<TaskId, TaskRef>> {
    Ok(project
        .tasks()?
        .into_iter()
        .map(|task| (task.id, task))
        .collect())
}

fn title_of(tasks: &BTreeMap<TaskId, TaskRef>, id: TaskId) -> &str {
    tasks.get(&id).map_or("", |task| task.title.as_str())
}

fn add(output: &Output, prerequisite: &str, dependent: &str) -> Result<()> {
    let (prerequisite, dependent) = parse_pair(prerequisite, dependent)?;
    let project = Project::open_current()?;

    if project.add_dependency(prerequisite, dependent)? {
        output.success(&format!("Added dependency: {} -> {}", prerequisite, dependent));
    } else {
        output.success(&format!(
            "Dependency already exists: {} -> {}",
            prerequisite, dependent
        ));
    }

    Ok(())
}

fn remove(output: &Output, prerequisite: &str, dependent: &str) -> Result<()> {
    let (prerequisite, dependent) = parse_pair(prerequisite, dependent)?;
    let project = Project::open_current()?;

    if project.remove_dependency(prerequisite, dependent)? {
        output.success(&format!("Removed dependency: {} -> {}", prerequisite, dependent));
    } else {
        output.success(&format!("No dependency: {} -> {}", prerequisite, dependent));
    }

    Ok(())
}

fn list(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let edges = project.orchestrator()?.graph().edges();

    if output.is_json() {
        output.data(&edges);
    } else if edges.is_empty() {
        println!("No dependencies");
    } else {
        for edge in &edges {
            output.row(&[
                edge.prerequisite.to_string().as_str(),
                "->",
                edge.dependent.to_string().as_str(),
            ]);
        }
    }

    Ok(())
}

/// Prints every task so that prerequisites come first
pub fn order(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let order = project.orchestrator()?.topological_order()?;

    if output.is_json() {
        output.data(&order);
        return Ok(());
    }

    let tasks = titles(&project)?;
    for (position, id) in order.iter().enumerate() {
        println!("{:>3}. {:<8} {}", position + 1, id.to_string(), title_of(&tasks, *id));
    }

    Ok(())
}

pub fn critical_path(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let path = project.orchestrator()?.critical_path()?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path,
            "length": path.len(),
        }));
        return Ok(());
    }

    if path.is_empty() {
        println!("No tasks");
        return Ok(());
    }

    let tasks = titles(&project)?;
    let chain: Vec<_> = path.iter().map(ToString::to_string).collect();
    println!("{} ({} tasks)", chain.join(" -> "), path.len());
    for id in &path {
        println!("  {:<8} {}", id.to_string(), title_of(&tasks, *id));
    }

    Ok(())
}

pub fn impact(output: &Output, id: &str) -> Result<()> {
    let id: TaskId = id.parse()?;
    let project = Project::open_current()?;
    let affected = project.orchestrator()?.impact(id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": id,
            "affected": affected,
        }));
        return Ok(());
    }

    if affected.is_empty() {
        println!("Nothing depends on {}", id);
        return Ok(());
    }

    let tasks = titles(&project)?;
    println!("{} task(s) wait on {}:", affected.len(), id);
    for affected_id in &affected {
        println!("  {:<8} {}", affected_id.to_string(), title_of(&tasks, *affected_id));
    }

    Ok(())
}
