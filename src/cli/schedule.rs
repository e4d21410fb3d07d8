//! Ranking and assignment commands

use anyhow::Result;
use tracing::info;

use super::output::Output;
use super::task::print_tasks;
use crate::domain::WorkerId;
use crate::engine::{apply_plan, AssignmentRequest, Strategy, TaskSource, WorkerSource};
use crate::storage::Project;

pub fn top(output: &Output, k: Option<usize>) -> Result<()> {
    let project = Project::open_current()?;
    let orchestrator = project.orchestrator()?;
    let k = k.unwrap_or(orchestrator.config().top_k);

    let top = orchestrator.top_urgent(&project.tasks()?, k)?;

    if top.is_empty() && output.is_text() {
        println!("No pending unassigned tasks");
        return Ok(());
    }

    print_tasks(output, &top);
    Ok(())
}

pub fn next(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let next = project.orchestrator()?.next_task(&project.tasks()?)?;

    match next {
        Some(task) if output.is_json() => output.data(&task),
        Some(task) => print_tasks(output, std::slice::from_ref(&task)),
        None if output.is_json() => output.data(&serde_json::Value::Null),
        None => println!("No pending unassigned tasks"),
    }

    Ok(())
}

pub fn assign(
    output: &Output,
    strategy: Option<&str>,
    workers: &[String],
    limit: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    let worker_ids = workers
        .iter()
        .map(|id| id.trim().parse::<WorkerId>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut project = Project::open_current()?;
    let orchestrator = project.orchestrator()?;

    let strategy = strategy.map_or(orchestrator.config().default_strategy, Strategy::from);
    let request = AssignmentRequest {
        strategy,
        workers: worker_ids,
        limit,
    };

    let plan = orchestrator.plan_assignment(&project.tasks()?, &project.workers()?, &request)?;

    let applied = if plan.success && !dry_run {
        apply_plan(&mut project, &plan)?
    } else {
        0
    };
    if dry_run {
        info!(planned = plan.assigned_count, "dry run, nothing saved");
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": plan.success,
            "strategy": plan.strategy,
            "assigned_count": plan.assigned_count,
            "per_worker": plan.per_worker,
            "assignments": plan.assignments,
            "message": plan.message,
            "dry_run": dry_run,
            "applied": applied,
        }));
        return Ok(());
    }

    if !plan.success {
        println!("{}", plan.message);
        return Ok(());
    }

    let prefix = if dry_run { "[dry run] " } else { "" };
    println!("{}{} (strategy: {})", prefix, plan.message, plan.strategy);
    for assignment in &plan.assignments {
        println!("  {} -> {}", assignment.task, assignment.worker);
    }
    for (worker, count) in &plan.per_worker {
        println!("{:<8} {}", worker.to_string(), count);
    }

    Ok(())
}
