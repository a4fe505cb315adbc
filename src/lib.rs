//! taskplan - deadline-aware task scheduling for project trackers
//!
//! Given a set of tasks with hour estimates, optional due dates and
//! dependencies, taskplan produces a dependency-valid execution order, a
//! single-track timeline and a written rationale. The engine is a pure
//! function of its input and the `now` it is given.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use taskplan::{plan, Task};
//!
//! let now = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
//! let result = plan(
//!     vec![Task::new("Build", 4.0).after("Design"), Task::new("Design", 2.0)],
//!     now,
//! )
//! .unwrap();
//!
//! assert_eq!(result.recommended_order, vec!["Design", "Build"]);
//! ```

pub mod domain;
pub mod planner;
pub mod config;
pub mod intake;
pub mod cli;

pub use domain::{DependencyGraph, ScheduleError, ScheduleResult, Task};
pub use planner::{plan, plan_now};
