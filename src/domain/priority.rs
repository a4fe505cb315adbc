//! Priority rule for the ready set
//!
//! A single total order decides which ready task runs next:
//!
//! 1. earliest effective due date (no due date sorts after every real one)
//! 2. shorter estimate
//! 3. earlier position in the input
//!
//! Lower keys are more urgent.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::task::Task;

/// Effective due date of a task
///
/// `Open` is the sentinel for "no deadline" and compares greater than every
/// `At`, so the comparator never branches on optionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Deadline {
    At(DateTime<Utc>),
    Open,
}

impl Deadline {
    pub fn of(task: &Task) -> Self {
        match task.due_date {
            Some(due) => Deadline::At(due),
            None => Deadline::Open,
        }
    }
}

/// Sort key for a ready task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityKey {
    pub deadline: Deadline,
    pub hours: f64,
    pub input_index: usize,
}

impl PriorityKey {
    pub fn new(task: &Task, input_index: usize) -> Self {
        Self {
            deadline: Deadline::of(task),
            hours: task.estimated_hours,
            input_index,
        }
    }
}

impl Eq for PriorityKey {}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.hours.total_cmp(&other.hours))
            .then(self.input_index.cmp(&other.input_index))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
