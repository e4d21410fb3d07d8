//! Project management
//!
//! Handles project initialization, provides access to stores and loads the
//! scheduling orchestrator from them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::{Config, ProjectConfig, PROJECT_DIR};
use super::jsonl::{DependencyStore, TaskStore, WorkerStore};
use crate::domain::{DependencyGraph, Edge, TaskId, TaskRef, Worker, WorkerId, LEAST_URGENT, MOST_URGENT};
use crate::engine::{Assignment, SchedulingOrchestrator, TaskSource, WorkerSource};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a crewplan project. Run 'crewplan init' first.")]
    NotInProject,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Urgency must be between 1 and 5, got {0}")]
    InvalidUrgency(u8),

    #[error("No {0} ids left after {1}")]
    IdsExhausted(&'static str, String),
}

/// A crewplan project rooted at a directory holding `.crewplan/`
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::load_project_config(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;
        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running this twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, data_dir.display())
        })?;

        if !data_dir.join("config.toml").exists() {
            Config::save_project_config(&root, &ProjectConfig::default())?;
        }

        info!(root = %root.display(), "project initialized");
        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .crewplan directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_project(&self.root)
    }

    pub fn worker_store(&self) -> WorkerStore {
        WorkerStore::for_project(&self.root)
    }

    pub fn dependency_store(&self) -> DependencyStore {
        DependencyStore::for_project(&self.root)
    }

    /// Creates a task with the next free id
    pub fn add_task(&self, title: &str, urgency: u8, deadline: NaiveDate) -> Result<TaskRef> {
        if !(MOST_URGENT..=LEAST_URGENT).contains(&urgency) {
            return Err(ProjectError::InvalidUrgency(urgency).into());
        }

        let store = self.task_store();
        let id = match store.read_all()?.keys().next_back() {
            None => TaskId::new(1),
            Some(last) => last
                .next()
                .ok_or_else(|| ProjectError::IdsExhausted("task", last.to_string()))?,
        };

        let task = TaskRef::new(id, title, urgency, deadline);
        store.append(&task)?;
        info!(task = %id, urgency, "task added");
        Ok(task)
    }

    /// Reads one task, failing if it doesn't exist
    pub fn task(&self, id: TaskId) -> Result<TaskRef> {
        self.task_store()
            .get(&id)?
            .ok_or_else(|| ProjectError::TaskNotFound(id).into())
    }

    /// Applies `change` to a stored task and saves it
    pub fn update_task<F>(&self, id: TaskId, change: F) -> Result<TaskRef>
    where
        F: FnOnce(&mut TaskRef),
    {
        let mut task = self.task(id)?;
        change(&mut task);
        self.task_store().update(&task)?;
        debug!(task = %id, status = task.status.as_str(), "task updated");
        Ok(task)
    }

    /// Deletes a task together with every dependency that mentions it
    pub fn remove_task(&self, id: TaskId) -> Result<()> {
        let mut orchestrator = self.orchestrator()?;
        if !orchestrator.forget_task(id) {
            return Err(ProjectError::TaskNotFound(id).into());
        }

        // Task first: a dangling edge is skipped on load.
        self.task_store().remove(&id)?;
        self.dependency_store()
            .write_records(orchestrator.graph().edges().iter())?;
        info!(task = %id, "task removed");
        Ok(())
    }

    /// Registers a worker with the next free id
    pub fn add_worker(&self, name: &str) -> Result<Worker> {
        let store = self.worker_store();
        let id = match store.read_all()?.keys().next_back() {
            None => WorkerId::new(1),
            Some(last) => last
                .next()
                .ok_or_else(|| ProjectError::IdsExhausted("worker", last.to_string()))?,
        };

        let worker = Worker::new(id, name);
        store.append(&worker)?;
        info!(worker = %id, "worker added");
        Ok(worker)
    }

    /// Builds an orchestrator holding every task and stored dependency
    ///
    /// Edges are replayed in the order they were saved. Lines that no longer
    /// apply (a missing task, or a cycle from a hand edit) are skipped with
    /// a warning rather than failing the load.
    pub fn orchestrator(&self) -> Result<SchedulingOrchestrator> {
        let tasks = self.task_store().read_all()?;
        let edges = self.dependency_store().read_records()?;
        let (graph, rejected) = DependencyGraph::from_parts(tasks.into_keys(), &edges);

        for (edge, e) in &rejected {
            warn!(
                prerequisite = %edge.prerequisite,
                dependent = %edge.dependent,
                error = %e,
                "skipping stored dependency"
            );
        }

        debug!(tasks = graph.len(), edges = graph.edge_count(), "dependency graph loaded");
        Ok(SchedulingOrchestrator::with_graph(
            graph,
            self.config.engine.clone(),
        ))
    }

    /// Adds a dependency and saves it, returning false if it already existed
    pub fn add_dependency(&self, prerequisite: TaskId, dependent: TaskId) -> Result<bool> {
        let mut orchestrator = self.orchestrator()?;
        if orchestrator.graph().has_edge(prerequisite, dependent) {
            return Ok(false);
        }

        orchestrator.add_dependency(prerequisite, dependent)?;
        self.dependency_store()
            .append(&Edge::new(prerequisite, dependent))?;
        Ok(true)
    }

    /// Removes a dependency, returning whether it existed
    pub fn remove_dependency(&self, prerequisite: TaskId, dependent: TaskId) -> Result<bool> {
        let mut orchestrator = self.orchestrator()?;
        if !orchestrator.remove_dependency(prerequisite, dependent) {
            return Ok(false);
        }

        self.dependency_store()
            .write_records(orchestrator.graph().edges().iter())?;
        Ok(true)
    }
}

impl TaskSource for Project {
    fn tasks(&self) -> Result<Vec<TaskRef>> {
        Ok(self.task_store().read_all()?.into_values().collect())
    }

    fn assign(&mut self, task: TaskId, worker: WorkerId) -> Result<()> {
        self.update_task(task, |t| t.assign(worker))?;
        Ok(())
    }

    /// Applies the whole batch with one rewrite of the task file
    ///
    /// Every task is checked before anything is written, so an unknown id
    /// leaves the file untouched.
    fn assign_all(&mut self, assignments: &[Assignment]) -> Result<usize> {
        let store = self.task_store();
        let mut tasks = store.read_all()?;
        for assignment in assignments {
            tasks
                .get_mut(&assignment.task)
                .ok_or(ProjectError::TaskNotFound(assignment.task))?
                .assign(assignment.worker);
        }

        store.write_all(&tasks)?;
        debug!(saved = assignments.len(), "assignments saved");
        Ok(assignments.len())
    }
}

impl WorkerSource for Project {
    fn workers(&self) -> Result<Vec<Worker>> {
        Ok(self.worker_store().read_all()?.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{apply_plan, AssignmentRequest, Strategy};
    use tempfile::TempDir;

    fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    fn tid(n: u32) -> TaskId {
        TaskId::new(n)
    }

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.data_dir().is_dir());
        let config = fs::read_to_string(project.data_dir().join("config.toml")).unwrap();
        assert!(config.contains("[engine]"));
        assert!(config.contains("ranker_capacity = 100"));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        project.add_task("Keep me", 2, deadline()).unwrap();

        let again = Project::init(dir.path()).unwrap();
        assert_eq!(again.tasks().unwrap().len(), 1);
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).err().unwrap();
        assert!(err.to_string().contains("crewplan init"));
    }

    #[test]
    fn task_ids_increase() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.add_task("One", 1, deadline()).unwrap().id, tid(1));
        assert_eq!(project.add_task("Two", 5, deadline()).unwrap().id, tid(2));
        assert_eq!(project.add_worker("Ada").unwrap().id, WorkerId::new(1));
    }

    #[test]
    fn urgency_out_of_range() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        for urgency in [0, 6] {
            let err = project.add_task("Bad", urgency, deadline()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ProjectError>(),
                Some(ProjectError::InvalidUrgency(_))
            ));
        }
    }

    #[test]
    fn dependencies_persist_and_reject_cycles() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        for title in ["a", "b", "c"] {
            project.add_task(title, 3, deadline()).unwrap();
        }

        assert!(project.add_dependency(tid(1), tid(2)).unwrap());
        assert!(project.add_dependency(tid(2), tid(3)).unwrap());
        assert!(!project.add_dependency(tid(1), tid(2)).unwrap());
        assert!(project.add_dependency(tid(3), tid(1)).is_err());

        let stored = project.dependency_store().read_records().unwrap();
        assert_eq!(stored, vec![Edge::new(tid(1), tid(2)), Edge::new(tid(2), tid(3))]);

        let order = project.orchestrator().unwrap().topological_order().unwrap();
        assert_eq!(order, vec![tid(1), tid(2), tid(3)]);
    }

    #[test]
    fn remove_dependency_rewrites_store() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        for title in ["a", "b"] {
            project.add_task(title, 3, deadline()).unwrap();
        }
        project.add_dependency(tid(1), tid(2)).unwrap();

        assert!(project.remove_dependency(tid(1), tid(2)).unwrap());
        assert!(!project.remove_dependency(tid(1), tid(2)).unwrap());
        assert!(project.dependency_store().read_records().unwrap().is_empty());
    }

    #[test]
    fn remove_task_drops_its_edges() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        for title in ["a", "b", "c"] {
            project.add_task(title, 3, deadline()).unwrap();
        }
        project.add_dependency(tid(1), tid(2)).unwrap();
        project.add_dependency(tid(1), tid(3)).unwrap();

        project.remove_task(tid(2)).unwrap();

        assert!(project.task(tid(2)).is_err());
        let stored = project.dependency_store().read_records().unwrap();
        assert_eq!(stored, vec![Edge::new(tid(1), tid(3))]);
        assert!(project.remove_task(tid(2)).is_err());
    }

    #[test]
    fn stale_edges_are_skipped_on_load() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        project.add_task("a", 3, deadline()).unwrap();
        project
            .dependency_store()
            .append(&Edge::new(tid(1), tid(9)))
            .unwrap();

        let orchestrator = project.orchestrator().unwrap();
        assert_eq!(orchestrator.graph().edge_count(), 0);
    }

    #[test]
    fn assignment_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::init(dir.path()).unwrap();
        for i in 1..=4 {
            project.add_task(&format!("Task {}", i), 3, deadline()).unwrap();
        }
        let ada = project.add_worker("Ada").unwrap();
        let bob = project.add_worker("Bob").unwrap();

        let orchestrator = project.orchestrator().unwrap();
        let request = AssignmentRequest::new(Strategy::RoundRobin, vec![ada.id, bob.id]);
        let plan = orchestrator
            .plan_assignment(&project.tasks().unwrap(), &project.workers().unwrap(), &request)
            .unwrap();
        apply_plan(&mut project, &plan).unwrap();

        let loads = orchestrator.workload(&project.tasks().unwrap(), &project.workers().unwrap());
        assert_eq!(loads.iter().map(|w| w.load).collect::<Vec<_>>(), vec![2, 2]);
    }

    #[test]
    fn failed_task_removal_keeps_its_edges() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        for title in ["a", "b"] {
            project.add_task(title, 3, deadline()).unwrap();
        }
        project.add_dependency(tid(1), tid(2)).unwrap();

        // A directory where the temp file goes makes the task rewrite fail.
        let blocker = project.task_store().path().with_extension("jsonl.tmp");
        fs::create_dir(&blocker).unwrap();

        assert!(project.remove_task(tid(2)).is_err());
        assert!(project.task(tid(2)).is_ok());
        let stored = project.dependency_store().read_records().unwrap();
        assert_eq!(stored, vec![Edge::new(tid(1), tid(2))]);
    }

    #[test]
    fn ids_stop_at_the_last_value() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        project
            .task_store()
            .append(&TaskRef::new(TaskId::new(u32::MAX), "edited by hand", 3, deadline()))
            .unwrap();

        let err = project.add_task("one more", 3, deadline()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::IdsExhausted("task", _))
        ));
    }

    #[test]
    fn plan_with_a_missing_task_saves_nothing() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::init(dir.path()).unwrap();
        for i in 1..=3 {
            project.add_task(&format!("Task {}", i), 3, deadline()).unwrap();
        }
        let ada = project.add_worker("Ada").unwrap();

        let request = AssignmentRequest::new(Strategy::RoundRobin, vec![ada.id]);
        let plan = project
            .orchestrator()
            .unwrap()
            .plan_assignment(&project.tasks().unwrap(), &project.workers().unwrap(), &request)
            .unwrap();
        assert_eq!(plan.assigned_count, 3);

        // The snapshot goes stale before the plan is applied.
        project.remove_task(tid(3)).unwrap();

        assert!(apply_plan(&mut project, &plan).is_err());
        assert!(project.tasks().unwrap().iter().all(|t| t.assigned_to.is_none()));
    }
}
