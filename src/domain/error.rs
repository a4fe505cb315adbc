//! Validation failures raised while building and ordering a task set
//!
//! Every variant is deterministic: the same input always produces the same
//! error, so none of them is worth retrying without fixing the data.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Duplicate task title: {0}")]
    DuplicateTitle(String),

    #[error("Task '{task}' depends on unknown task '{missing}'")]
    UnknownDependency { task: String, missing: String },

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(String),

    #[error("Task '{task}' has an invalid estimate: {hours} hours")]
    InvalidEstimate { task: String, hours: f64 },

    #[error("Dependency cycle among tasks: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),
}

impl ScheduleError {
    /// Stable machine-readable name of the failure
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::DuplicateTitle(_) => "DuplicateTitle",
            ScheduleError::UnknownDependency { .. } => "UnknownDependency",
            ScheduleError::SelfDependency(_) => "SelfDependency",
            ScheduleError::InvalidEstimate { .. } => "InvalidEstimate",
            ScheduleError::DependencyCycle(_) => "DependencyCycle",
        }
    }

    /// Titles implicated in the failure
    pub fn titles(&self) -> Vec<String> {
        match self {
            ScheduleError::DuplicateTitle(title)
            | ScheduleError::SelfDependency(title)
            | ScheduleError::InvalidEstimate { task: title, .. } => vec![title.clone()],
            ScheduleError::UnknownDependency { task, missing } => {
                vec![task.clone(), missing.clone()]
            }
            ScheduleError::DependencyCycle(titles) => titles.clone(),
        }
    }

    /// Builds the error object returned to callers
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            titles: self.titles(),
            message: self.to_string(),
        }
    }
}

/// Serializable error object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub titles: Vec<String>,
    pub message: String,
}
