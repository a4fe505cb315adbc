//! Entry point tying the engine stages together

use chrono::{DateTime, Utc};
use tracing::{debug, info_span};

use crate::domain::{scheduler, timeline, DependencyGraph, ScheduleError, ScheduleResult, Task};

/// Plans a task set, projecting the timeline from `now`
///
/// Identical tasks and `now` always give an identical result.
pub fn plan(tasks: Vec<Task>, now: DateTime<Utc>) -> Result<ScheduleResult, ScheduleError> {
    let span = info_span!("plan", tasks = tasks.len());
    let _guard = span.enter();

    let graph = DependencyGraph::build(tasks)?;
    let order = scheduler::schedule(&graph)?;
    let result = timeline::project(&order, &graph, now);

    debug!(
        total_hours = result.metrics.total_estimated_hours,
        at_risk = result.analysis.at_risk.len(),
        "plan complete"
    );

    Ok(result)
}

/// Plans a task set against the wall clock
pub fn plan_now(tasks: Vec<Task>) -> Result<ScheduleResult, ScheduleError> {
    plan(tasks, Utc::now())
}

/// Validates and orders a task set without projecting it
pub fn order(tasks: Vec<Task>) -> Result<Vec<String>, ScheduleError> {
    let graph = DependencyGraph::build(tasks)?;
    scheduler::schedule(&graph)
}
