use crate::repository::{RepositoryError, TaskRepository};
use crate::task::{Status, Task, TaskError};
use chrono::Utc;
use thiserror::Error;
use tracing::warn;

/// Errors returned by [`TaskService`].
///
/// Entity errors pass through untouched; repository errors gain the name of
/// the operation that failed while keeping the original as their source.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("{operation} failed")]
    Repository {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::Repository {
                source: RepositoryError::NotFound(_),
                ..
            }
        )
    }

    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            ServiceError::Task(err) => Some(err),
            ServiceError::Repository { .. } => None,
        }
    }
}

fn context(operation: &'static str) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |source| ServiceError::Repository { operation, source }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// `""` and `"all"` select everything. Unrecognized values also select
    /// everything rather than failing.
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "all" => StatusFilter::All,
            other => match other.parse::<Status>() {
                Ok(status) => StatusFilter::Only(status),
                Err(_) => {
                    warn!(filter = other, "unknown status filter, listing all tasks");
                    StatusFilter::All
                }
            },
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status() == *status,
        }
    }
}

impl From<&str> for StatusFilter {
    fn from(value: &str) -> Self {
        StatusFilter::parse(value)
    }
}

pub struct TaskService<R: TaskRepository> {
    repository: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Creates a task in the `todo` state and stores it.
    ///
    /// Nothing is written when the description is empty.
    #[tracing::instrument(skip(self))]
    pub fn add(&self, description: &str) -> Result<Task, ServiceError> {
        let task = Task::new(description)?;
        task.validate()?;
        self.repository.save(task).map_err(context("save task"))
    }

    #[tracing::instrument(skip(self))]
    pub fn update(&self, id: i64, description: &str) -> Result<Task, ServiceError> {
        let mut task = self.load(id)?;
        task.update_description(description)?;
        self.store(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn mark_in_progress(&self, id: i64) -> Result<Task, ServiceError> {
        let mut task = self.load(id)?;
        task.mark_in_progress()?;
        self.store(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn mark_done(&self, id: i64) -> Result<Task, ServiceError> {
        let mut task = self.load(id)?;
        task.mark_done()?;
        self.store(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.repository.delete(id).map_err(context("delete task"))
    }

    /// Returns the tasks selected by `filter`, in stored order.
    #[tracing::instrument(skip(self))]
    pub fn list(&self, filter: StatusFilter) -> Result<Vec<Task>, ServiceError> {
        let tasks = self.repository.find_all().map_err(context("list tasks"))?;
        Ok(tasks.into_iter().filter(|task| filter.matches(task)).collect())
    }

    #[tracing::instrument(skip(self))]
    pub fn get_by_id(&self, id: i64) -> Result<Task, ServiceError> {
        self.load(id)
    }

    fn load(&self, id: i64) -> Result<Task, ServiceError> {
        self.repository.find_by_id(id).map_err(context("load task"))
    }

    fn store(&self, mut task: Task) -> Result<Task, ServiceError> {
        // A stored created_at may be ahead of this machine's clock.
        task.touch(Utc::now().max(task.created_at()));
        task.validate()?;
        self.repository.update(task).map_err(context("update task"))
    }
}
