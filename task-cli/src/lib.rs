pub mod config;
pub mod repository;
pub mod service;
pub mod task;

pub use repository::{JsonFileRepository, PersistenceError, RepositoryError, TaskRepository};
pub use service::{ServiceError, StatusFilter, TaskService};
pub use task::{Status, Task, TaskError};
