//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use super::output::{Output, OutputFormat};
use super::{deps, schedule, task, worker};
use crate::logging;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "crewplan")]
#[command(author, version, about = "Dependency-aware task scheduling for small teams")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new crewplan project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Manage workers
    #[command(subcommand)]
    Worker(worker::WorkerCommands),

    /// Manage dependencies between tasks
    #[command(subcommand)]
    Dep(deps::DepCommands),

    /// Print every task in dependency order
    Order,

    /// Print the longest dependency chain
    CriticalPath,

    /// Show every task blocked, directly or not, by a task
    Impact {
        /// Task ID
        id: String,
    },

    /// Show the most urgent unassigned tasks
    Top {
        /// How many tasks to show (defaults to engine.top_k)
        #[arg(long, short = 'k')]
        k: Option<usize>,
    },

    /// Show the single most urgent unassigned task
    Next,

    /// Distribute unassigned pending tasks across workers
    ///
    /// Examples:
    ///   crewplan assign --workers w-1,w-2
    ///   crewplan assign --strategy least_workload --workers 1,2,3 --limit 5
    Assign {
        /// round_robin, least_workload or skill_match (defaults to engine.default_strategy)
        #[arg(long, short = 's')]
        strategy: Option<String>,

        /// Candidate worker IDs, in rotation order
        #[arg(long, short = 'w', value_delimiter = ',', required = true)]
        workers: Vec<String>,

        /// Maximum number of tasks to assign (0 means no limit)
        #[arg(long, short = 'l')]
        limit: Option<usize>,

        /// Show the plan without saving it
        #[arg(long)]
        dry_run: bool,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let global = Config::load_global()?;

    logging::init_logging(cli.verbose, global.log_level.as_deref())?;

    let format = cli.format.unwrap_or_else(|| global.default_format.into());
    let output = Output::new(format);
    debug!(?format, "crewplan starting");

    match cli.command {
        Commands::Init { path } => {
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized crewplan project at {}",
                project.root().display()
            ));
        }

        Commands::Task(cmd) => task::run(cmd, &output)?,
        Commands::Worker(cmd) => worker::run(cmd, &output)?,
        Commands::Dep(cmd) => deps::run(cmd, &output)?,

        Commands::Order => deps::order(&output)?,
        Commands::CriticalPath => deps::critical_path(&output)?,
        Commands::Impact { id } => deps::impact(&output, &id)?,

        Commands::Top { k } => schedule::top(&output, k)?,
        Commands::Next => schedule::next(&output)?,
        Commands::Assign {
            strategy,
            workers,
            limit,
            dry_run,
        } => schedule::assign(&output, strategy.as_deref(), &workers, limit, dry_run)?,
    }

    debug!("command completed");
    Ok(())
}
