use crate::task::Task;
use chrono::Utc;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("task {0} not found")]
    NotFound(i64),
    #[error("no task id left after {0}")]
    IdsExhausted(i64),
    #[error("cannot access task file {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: PersistenceError,
    },
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O failure")]
    Io(#[from] io::Error),
    #[error("malformed task collection")]
    Json(#[from] serde_json::Error),
}

/// Storage for the whole task collection.
///
/// Every call is one complete unit of work: implementations never expose a
/// collection with a half-applied change.
#[cfg_attr(test, mockall::automock)]
pub trait TaskRepository {
    /// Assigns the next id, stamps both timestamps and appends the task.
    fn save(&self, task: Task) -> Result<Task, RepositoryError>;
    /// Replaces the stored task with the same id, keeping its original `created_at`.
    fn update(&self, task: Task) -> Result<Task, RepositoryError>;
    fn delete(&self, id: i64) -> Result<(), RepositoryError>;
    /// Returns tasks in stored order.
    fn find_all(&self) -> Result<Vec<Task>, RepositoryError>;
    fn find_by_id(&self, id: i64) -> Result<Task, RepositoryError>;
}

/// A [`TaskRepository`] backed by a single pretty-printed JSON array on disk.
///
/// The mutex serializes operations within one process only. Two processes
/// writing the same file can still lose updates.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn acquire(&self) -> MutexGuard<'_, ()> {
        // Writes go through a rename, so a panicked holder never leaves a partial file.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_tasks(&self) -> Result<Vec<Task>, RepositoryError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task file missing, initializing empty collection");
                self.write_tasks(&[])?;
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.persistence(err)),
        };

        let tasks: Vec<Task> = serde_json::from_slice(&data).map_err(|err| self.persistence(err))?;
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<(), RepositoryError> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b" "));
        tasks
            .serialize(&mut serializer)
            .map_err(|err| self.persistence(err))?;

        let temp_path = self.temp_path();
        let write = || -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(&buffer)?;
            file.sync_all()?;
            fs::rename(&temp_path, &self.path)
        };
        write().map_err(|err| {
            let _ = fs::remove_file(&temp_path);
            self.persistence(err)
        })?;

        debug!(path = %self.path.display(), count = tasks.len(), "wrote tasks");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn persistence(&self, source: impl Into<PersistenceError>) -> RepositoryError {
        RepositoryError::Persistence {
            path: self.path.clone(),
            source: source.into(),
        }
    }
}

fn next_id(tasks: &[Task]) -> Result<i64, RepositoryError> {
    let max = tasks.iter().map(Task::id).max().unwrap_or(0).max(0);
    max.checked_add(1).ok_or(RepositoryError::IdsExhausted(max))
}

impl TaskRepository for JsonFileRepository {
    fn save(&self, mut task: Task) -> Result<Task, RepositoryError> {
        let _guard = self.acquire();
        let mut tasks = self.load_tasks()?;

        let now = Utc::now();
        task.id = next_id(&tasks)?;
        task.created_at = now;
        task.updated_at = now;
        tasks.push(task.clone());

        self.write_tasks(&tasks)?;
        debug!(id = task.id, "saved task");
        Ok(task)
    }

    fn update(&self, mut task: Task) -> Result<Task, RepositoryError> {
        let _guard = self.acquire();
        let mut tasks = self.load_tasks()?;

        let stored = tasks
            .iter_mut()
            .find(|stored| stored.id == task.id)
            .ok_or(RepositoryError::NotFound(task.id))?;
        task.created_at = stored.created_at;
        task.updated_at = Utc::now().max(stored.created_at);
        *stored = task.clone();

        self.write_tasks(&tasks)?;
        debug!(id = task.id, "updated task");
        Ok(task)
    }

    fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let _guard = self.acquire();
        let mut tasks = self.load_tasks()?;

        let index = tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        tasks.remove(index);

        self.write_tasks(&tasks)?;
        debug!(id, "deleted task");
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Task>, RepositoryError> {
        let _guard = self.acquire();
        self.load_tasks()
    }

    fn find_by_id(&self, id: i64) -> Result<Task, RepositoryError> {
        let _guard = self.acquire();
        self.load_tasks()?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or(RepositoryError::NotFound(id))
    }
}
