//! JSONL storage
//!
//! Each record type lives in its own file under `.crewplan/` with one JSON
//! object per line. Reads take a shared lock and writes an exclusive one;
//! full rewrites go through a temp file and a rename.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::PROJECT_DIR;
use crate::domain::{Edge, TaskId, TaskRef, Worker, WorkerId};

/// Records addressed by a unique key
///
/// When a keyed file holds the same key more than once, the last line wins.
pub trait Keyed {
    type Key: Ord + Clone;

    fn key(&self) -> Self::Key;
}

impl Keyed for TaskRef {
    type Key = TaskId;

    fn key(&self) -> TaskId {
        self.id
    }
}

impl Keyed for Worker {
    type Key = WorkerId;

    fn key(&self) -> WorkerId {
        self.id
    }
}

/// Tasks, keyed by id
pub type TaskStore = JsonlStore<TaskRef>;

/// Workers, keyed by id
pub type WorkerStore = JsonlStore<Worker>;

/// Dependency edges, in the order they were added
pub type DependencyStore = JsonlStore<Edge>;

/// A JSONL file of `T` records
pub struct JsonlStore<T> {
    path: PathBuf,
    kind: &'static str,
    _record: PhantomData<T>,
}

impl<T> JsonlStore<T> {
    /// Creates a store at the given path; `kind` names the records in errors
    pub fn new(path: impl Into<PathBuf>, kind: &'static str) -> Self {
        Self {
            path: path.into(),
            kind,
            _record: PhantomData,
        }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore {
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join("tasks.jsonl"), "task")
    }
}

impl WorkerStore {
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join("workers.jsonl"), "worker")
    }
}

impl DependencyStore {
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(
            project_root.join(PROJECT_DIR).join("dependencies.jsonl"),
            "dependency",
        )
    }
}

impl<T: Serialize + DeserializeOwned> JsonlStore<T> {
    /// Reads every record in file order
    pub fn read_records(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", self.kind, self.path.display()))?;

        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {} store", self.kind))?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: T = serde_json::from_str(&line).with_context(|| {
                format!("Failed to parse {} at line {}", self.kind, line_num + 1)
            })?;
            records.push(record);
        }

        // Lock is released when file is dropped
        Ok(records)
    }

    /// Replaces the file's contents with `records`
    pub fn write_records<'a, I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.ensure_parent()?;

        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire write lock on {} store", self.kind))?;

            let mut writer = BufWriter::new(&file);
            for record in records {
                let line = serde_json::to_string(record)
                    .with_context(|| format!("Failed to serialize {}", self.kind))?;
                writeln!(writer, "{}", line)
                    .with_context(|| format!("Failed to write {}", self.kind))?;
            }

            writer
                .flush()
                .with_context(|| format!("Failed to flush {} store", self.kind))?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single record without rewriting the file
    pub fn append(&self, record: &T) -> Result<()> {
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", self.kind, self.path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {} store", self.kind))?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(record)
            .with_context(|| format!("Failed to serialize {}", self.kind))?;
        writeln!(writer, "{}", line).with_context(|| format!("Failed to write {}", self.kind))?;

        writer
            .flush()
            .with_context(|| format!("Failed to flush {} store", self.kind))?;

        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl<T: Keyed + Clone + Serialize + DeserializeOwned> JsonlStore<T> {
    /// Reads every record, keyed and deduplicated
    pub fn read_all(&self) -> Result<BTreeMap<T::Key, T>> {
        Ok(self
            .read_records()?
            .into_iter()
            .map(|record| (record.key(), record))
            .collect())
    }

    /// Rewrites the file with `records`, ordered by key
    pub fn write_all(&self, records: &BTreeMap<T::Key, T>) -> Result<()> {
        self.write_records(records.values())
    }

    /// Reads one record by key
    pub fn get(&self, key: &T::Key) -> Result<Option<T>> {
        Ok(self.read_all()?.remove(key))
    }

    /// Inserts or replaces a record (reads all, updates, writes all)
    pub fn update(&self, record: &T) -> Result<()> {
        let mut records = self.read_all()?;
        records.insert(record.key(), record.clone());
        self.write_all(&records)
    }

    /// Removes a record by key
    pub fn remove(&self, key: &T::Key) -> Result<bool> {
        let mut records = self.read_all()?;
        let removed = records.remove(key).is_some();
        if removed {
            self.write_all(&records)?;
        }
        Ok(removed)
    }
}
