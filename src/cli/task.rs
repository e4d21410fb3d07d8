//! Task CLI commands

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{TaskId, TaskRef, DEFAULT_URGENCY};
use crate::engine::TaskSource;
use crate::storage::Project;

/// Days until the deadline of a task added without `--deadline`
const DEFAULT_LEAD_DAYS: i64 = 7;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   crewplan task add "Fix login redirect"
    ///   crewplan task add "Ship release notes" --urgency 1 --deadline 2026-11-02
    Add {
        /// Task title
        title: String,

        /// 1 (most urgent) to 5
        #[arg(long, short = 'u', default_value_t = DEFAULT_URGENCY)]
        urgency: u8,

        /// Due date as YYYY-MM-DD (defaults to a week from today)
        #[arg(long, short = 'd')]
        deadline: Option<NaiveDate>,
    },

    /// List all tasks
    List,

    /// Mark task as in progress
    Start {
        /// Task ID
        id: String,
    },

    /// Mark task as done
    Done {
        /// Task ID
        id: String,
    },

    /// Delete a task and its dependencies
    Remove {
        /// Task ID
        id: String,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            urgency,
            deadline,
        } => add_task(output, &title, urgency, deadline),
        TaskCommands::List => list_tasks(output),
        TaskCommands::Start { id } => start_task(output, &id),
        TaskCommands::Done { id } => complete_task(output, &id),
        TaskCommands::Remove { id } => remove_task(output, &id),
    }
}

/// Today's date in local time
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Renders days left as `3d`, `today` or `2d overdue`
pub(crate) fn due_label(task: &TaskRef, today: NaiveDate) -> String {
    match task.days_left(today) {
        0 => "today".to_string(),
        days if days < 0 => format!("{}d overdue", -days),
        days => format!("{}d", days),
    }
}

/// Prints tasks as a table (text) or a JSON array
pub(crate) fn print_tasks(output: &Output, tasks: &[TaskRef]) {
    let today = today();

    if output.is_json() {
        let items: Vec<_> = tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                    "urgency": t.urgency,
                    "deadline": t.deadline,
                    "days_left": t.days_left(today),
                    "status": t.status,
                    "assigned_to": t.assigned_to,
                })
            })
            .collect();
        output.data(&items);
        return;
    }

    println!(
        "{:<8} {:<4} {:<12} {:<12} {:<12} {:<8} TITLE",
        "ID", "URG", "DEADLINE", "DUE", "STATUS", "WORKER"
    );
    for t in tasks {
        let worker = t.assigned_to.map_or_else(|| "-".to_string(), |w| w.to_string());
        println!(
            "{:<8} {:<4} {:<12} {:<12} {:<12} {:<8} {}",
            t.id.to_string(),
            t.urgency,
            t.deadline.to_string(),
            due_label(t, today),
            t.status.as_str(),
            worker,
            t.title
        );
    }
}

fn add_task(output: &Output, title: &str, urgency: u8, deadline: Option<NaiveDate>) -> Result<()> {
    let project = Project::open_current()?;
    let deadline = deadline.unwrap_or_else(|| today() + Duration::days(DEFAULT_LEAD_DAYS));

    let task = project.add_task(title, urgency, deadline)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Created task: {} - {}", task.id, task.title));
    }

    Ok(())
}

fn list_tasks(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.tasks()?;

    if tasks.is_empty() && output.is_text() {
        println!("No tasks found");
        return Ok(());
    }

    print_tasks(output, &tasks);
    Ok(())
}

fn start_task(output: &Output, id: &str) -> Result<()> {
    let id: TaskId = id.parse()?;
    let project = Project::open_current()?;

    let task = project.update_task(id, TaskRef::start)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Started task: {} - {}", task.id, task.title));
    }

    Ok(())
}

fn complete_task(output: &Output, id: &str) -> Result<()> {
    let id: TaskId = id.parse()?;
    let project = Project::open_current()?;

    let task = project.update_task(id, TaskRef::complete)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Completed task: {} - {}", task.id, task.title));
    }

    Ok(())
}

fn remove_task(output: &Output, id: &str) -> Result<()> {
    let id: TaskId = id.parse()?;
    let project = Project::open_current()?;

    project.remove_task(id)?;
    output.success(&format!("Removed task: {}", id));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_labels() {
        let deadline = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        let task = TaskRef::new(TaskId::new(1), "x", 3, deadline);

        assert_eq!(due_label(&task, NaiveDate::from_ymd_opt(2026, 4, 7).unwrap()), "3d");
        assert_eq!(due_label(&task, deadline), "today");
        assert_eq!(
            due_label(&task, NaiveDate::from_ymd_opt(2026, 4, 12).unwrap()),
            "2d overdue"
        );
    }
}
