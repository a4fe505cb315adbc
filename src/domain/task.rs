//! Task domain model
//!
//! A task is the unit of work the engine orders: a unique title, an hour
//! estimate, an optional deadline and the titles it must wait for.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde::{Serialize, Serializer};

/// A task as submitted for scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier within the request
    pub title: String,

    /// Duration of work in hours
    pub estimated_hours: f64,

    /// Optional deadline
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub due_date: Option<DateTime<Utc>>,

    /// Titles that must complete before this task starts
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Task {
    /// Creates a task with no deadline and no dependencies
    pub fn new(title: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            title: title.into(),
            estimated_hours,
            due_date: None,
            dependencies: Vec::new(),
        }
    }

    /// Sets the deadline
    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Adds a dependency on another task's title
    pub fn after(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !self.dependencies.contains(&title) {
            self.dependencies.push(title);
        }
        self
    }
}

/// Parses a timestamp as the tracker stores them
///
/// Accepts RFC 3339 with any offset, a naive `YYYY-MM-DDTHH:MM[:SS]` read as
/// UTC, or a bare `YYYY-MM-DD` read as midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserializes an optional timestamp with the formats of [`parse_timestamp`]
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
    }
}

/// Serializes a timestamp as RFC 3339 in UTC with second precision
pub fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

/// Formats a timestamp the way responses carry it
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
