use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("description is required")]
    EmptyDescription,
    #[error("invalid status '{0}', expected one of: todo, in-progress, done")]
    InvalidStatus(String),
    #[error("created date {created_at} is after updated date {updated_at}")]
    InvalidDateOrder {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
    #[error("can't transition from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },
}

#[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    /// Only single forward steps are legal: todo -> in-progress -> done.
    pub fn can_transition_to(&self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Todo, Status::InProgress) | (Status::InProgress, Status::Done)
        )
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(TaskError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(rename = "ID")]
    pub(crate) id: i64,
    pub(crate) description: String,
    pub(crate) status: Status,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task in the `todo` state. The id stays 0 until the repository
    /// assigns one on first save.
    pub fn new(description: impl Into<String>) -> Result<Self, TaskError> {
        let description = description.into();
        if description.is_empty() {
            return Err(TaskError::EmptyDescription);
        }

        let now = Utc::now();
        Ok(Self {
            id: 0,
            description,
            status: Status::Todo,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the description. Bumping `updated_at` is left to the caller.
    pub fn update_description(&mut self, description: impl Into<String>) -> Result<(), TaskError> {
        let description = description.into();
        if description.is_empty() {
            return Err(TaskError::EmptyDescription);
        }
        self.description = description;
        Ok(())
    }

    pub fn mark_in_progress(&mut self) -> Result<(), TaskError> {
        self.transition_to(Status::InProgress)
    }

    pub fn mark_done(&mut self) -> Result<(), TaskError> {
        self.transition_to(Status::Done)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Final guard run before a task is handed to storage.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.description.is_empty() {
            return Err(TaskError::EmptyDescription);
        }
        if self.created_at > self.updated_at {
            return Err(TaskError::InvalidDateOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    fn transition_to(&mut self, next: Status) -> Result<(), TaskError> {
        if !self.status.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
