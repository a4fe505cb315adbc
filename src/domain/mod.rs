//! Scheduling engine
//!
//! Pure computation over one request's task set, without any I/O:
//! [`DependencyGraph::build`] validates and indexes the tasks,
//! [`scheduler::schedule`] orders them, and [`timeline::project`] lays the
//! order out in time and explains it.

mod error;
mod graph;
mod priority;
mod task;
pub mod scheduler;
pub mod timeline;

pub use error::{ErrorReport, ScheduleError};
pub use graph::DependencyGraph;
pub use priority::{Deadline, PriorityKey};
pub use task::{format_timestamp, parse_timestamp, Task};
pub use timeline::{
    AtRisk, Analysis, Bottleneck, CriticalPath, Metrics, NearestDeadline, ScheduleResult,
    TimelineEntry,
};
