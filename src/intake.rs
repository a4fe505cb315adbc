//! Request intake
//!
//! Converts task records as the tracker stores them into engine [`Task`]s.
//! Records may be incomplete: missing titles and estimates get configured
//! defaults, completed records are dropped, and dependency lists may arrive
//! as JSON text rather than an array.
//!
//! Failures here (nothing to schedule, unreadable documents) are reported as
//! [`IntakeError`], never as scheduling validation errors.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use crate::config::IntakeConfig;
use crate::domain::{parse_timestamp, Task};

#[derive(Debug, Error, PartialEq)]
pub enum IntakeError {
    #[error("No tasks available to schedule")]
    NoTasks,

    #[error("All tasks are completed! No tasks to schedule.")]
    AllComplete,

    #[error("Task '{task}' has an unreadable due date: {value}")]
    InvalidDueDate { task: String, value: String },

    #[error("Invalid request 'now' timestamp: {0}")]
    InvalidNow(String),

    #[error("Failed to parse request: {0}")]
    Parse(String),
}

impl IntakeError {
    /// Stable machine-readable name of the failure
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeError::NoTasks => "NoTasks",
            IntakeError::AllComplete => "AllComplete",
            IntakeError::InvalidDueDate { .. } => "InvalidDueDate",
            IntakeError::InvalidNow(_) => "InvalidNow",
            IntakeError::Parse(_) => "Parse",
        }
    }
}

/// Dependency titles of a stored record
///
/// Accepted forms:
/// - `["Design", "Build"]`
/// - `"[\"Design\", \"Build\"]"` (the list stored as JSON text)
/// - `""` or `null` (no dependencies)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyList(Vec<String>);

impl DependencyList {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'de> Deserialize<'de> for DependencyList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{SeqAccess, Visitor};

        struct DependencyListVisitor;

        impl<'de> Visitor<'de> for DependencyListVisitor {
            type Value = DependencyList;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a list of task titles or a JSON-encoded list")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut titles = Vec::new();
                while let Some(title) = seq.next_element::<String>()? {
                    titles.push(title);
                }
                Ok(DependencyList(titles))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if value.trim().is_empty() {
                    return Ok(DependencyList::default());
                }
                serde_json::from_str::<Vec<String>>(value)
                    .map(DependencyList)
                    .map_err(|e| E::custom(format!("invalid dependency list {:?}: {}", value, e)))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(DependencyList::default())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(DependencyList::default())
            }
        }

        deserializer.deserialize_any(DependencyListVisitor)
    }
}

/// A task record as stored by the tracker
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub estimated_hours: Option<f64>,

    #[serde(default)]
    pub due_date: Option<String>,

    #[serde(default)]
    pub dependencies: DependencyList,

    #[serde(default, alias = "completed")]
    pub completion_status: Option<bool>,
}

impl TaskRecord {
    pub fn is_complete(&self) -> bool {
        self.completion_status.unwrap_or(false)
    }
}

/// `{ "tasks": [...], "now": "..." }` form of a request
#[derive(Deserialize)]
struct WrappedRequest {
    tasks: Vec<TaskRecord>,
    #[serde(default)]
    now: Option<String>,
}

/// Encoding of a request document
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RequestFormat {
    Json,
    Yaml,
}

impl RequestFormat {
    /// Picks the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                RequestFormat::Yaml
            }
            _ => RequestFormat::Json,
        }
    }

    /// Returns true if the document's top level is a list of records
    ///
    /// Leading blank lines, YAML comments and the `---` document marker are
    /// skipped.
    fn is_bare_list(self, content: &str) -> bool {
        match self {
            RequestFormat::Json => content.trim_start().starts_with('['),
            RequestFormat::Yaml => content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty() && !line.starts_with('#') && *line != "---")
                .is_some_and(|line| line.starts_with('-') || line.starts_with('[')),
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(self, content: &str) -> Result<T, IntakeError> {
        match self {
            RequestFormat::Json => {
                serde_json::from_str(content).map_err(|e| IntakeError::Parse(e.to_string()))
            }
            RequestFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| IntakeError::Parse(e.to_string()))
            }
        }
    }
}

/// A parsed scheduling request
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub records: Vec<TaskRecord>,
    /// Time reference carried by the document, if any
    pub now: Option<DateTime<Utc>>,
}

impl ScheduleRequest {
    /// Parses a request document: either a bare list of records or
    /// `{ "tasks": [...], "now": "..." }`
    pub fn parse(content: &str, format: RequestFormat) -> Result<Self, IntakeError> {
        if format.is_bare_list(content) {
            let records: Vec<TaskRecord> = format.decode(content)?;
            return Ok(Self { records, now: None });
        }

        let WrappedRequest { tasks, now } = format.decode(content)?;
        let now = match now {
            Some(raw) => Some(parse_timestamp(&raw).ok_or(IntakeError::InvalidNow(raw))?),
            None => None,
        };

        Ok(Self {
            records: tasks,
            now,
        })
    }

    /// Converts the records to engine tasks
    pub fn into_tasks(
        self,
        config: &IntakeConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<Task>, IntakeError> {
        normalize(self.records, config, now)
    }
}

/// Drops completed records and fills missing fields from `config`
///
/// Dependencies on a dropped record are satisfied already, so they are
/// removed from the remaining records.
pub fn normalize(
    records: Vec<TaskRecord>,
    config: &IntakeConfig,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, IntakeError> {
    if records.is_empty() {
        return Err(IntakeError::NoTasks);
    }

    let total = records.len();
    let (done, open): (Vec<TaskRecord>, Vec<TaskRecord>) =
        records.into_iter().partition(TaskRecord::is_complete);
    if open.is_empty() {
        return Err(IntakeError::AllComplete);
    }

    debug!(total, open = open.len(), "filtered completed tasks");

    let default_due = config
        .default_due_in_days
        .and_then(Duration::try_days)
        .and_then(|offset| now.checked_add_signed(offset));

    let mut tasks = open
        .into_iter()
        .map(|record| -> Result<Task, IntakeError> {
            let title = match record.title {
                Some(t) if !t.trim().is_empty() => t,
                _ => config.untitled_title.clone(),
            };

            let due_date = match record.due_date {
                Some(raw) if !raw.trim().is_empty() => {
                    Some(parse_timestamp(&raw).ok_or_else(|| IntakeError::InvalidDueDate {
                        task: title.clone(),
                        value: raw.clone(),
                    })?)
                }
                _ => default_due,
            };

            Ok(Task {
                title,
                estimated_hours: record
                    .estimated_hours
                    .unwrap_or(config.default_estimated_hours),
                due_date,
                dependencies: record.dependencies.into_inner(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // A title shared with an open record still names a task to schedule
    let open_titles: HashSet<String> = tasks.iter().map(|t| t.title.clone()).collect();
    let finished: HashSet<String> = done
        .into_iter()
        .filter_map(|record| record.title)
        .filter(|title| !open_titles.contains(title))
        .collect();

    if !finished.is_empty() {
        for task in &mut tasks {
            let before = task.dependencies.len();
            task.dependencies.retain(|dep| !finished.contains(dep));
            if task.dependencies.len() < before {
                debug!(
                    task = %task.title,
                    dropped = before - task.dependencies.len(),
                    "dependencies on completed tasks satisfied"
                );
            }
        }
    }

    Ok(tasks)
}
