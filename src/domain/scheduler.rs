//! Priority scheduler
//!
//! Kahn's algorithm with a priority queue for the ready set. The queue is
//! ordered by [`PriorityKey`], so the most urgent ready task is always placed
//! next. Tasks whose in-degree never reaches zero sit on a cycle (or behind
//! one) and fail the whole request.

use petgraph::graph::NodeIndex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::debug;

use super::error::ScheduleError;
use super::graph::DependencyGraph;
use super::priority::PriorityKey;

/// Orders every task of the graph so each one follows all its dependencies
pub fn schedule(graph: &DependencyGraph) -> Result<Vec<String>, ScheduleError> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.in_degree_at(idx))
        .collect();

    let mut ready: BinaryHeap<Reverse<(PriorityKey, NodeIndex)>> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .map(|idx| Reverse((key_for(graph, idx), idx)))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(Reverse((_, idx))) = ready.pop() {
        let task = graph.task_at(idx);
        debug!(task = %task.title, position = order.len(), "task scheduled");
        order.push(task.title.clone());

        for dependent in graph.dependents_at(idx) {
            let remaining = &mut in_degree[dependent.index()];
            *remaining -= 1;
            if *remaining == 0 {
                ready.push(Reverse((key_for(graph, dependent), dependent)));
            }
        }
    }

    if order.len() < graph.len() {
        let stuck: Vec<String> = graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] > 0)
            .map(|idx| graph.task_at(idx).title.clone())
            .collect();
        debug!(tasks = ?stuck, "dependency cycle detected");
        return Err(ScheduleError::DependencyCycle(stuck));
    }

    Ok(order)
}

fn key_for(graph: &DependencyGraph, idx: NodeIndex) -> PriorityKey {
    PriorityKey::new(graph.task_at(idx), idx.index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()
    }

    fn order_of(tasks: Vec<Task>) -> Result<Vec<String>, ScheduleError> {
        let graph = DependencyGraph::build(tasks)?;
        schedule(&graph)
    }

    #[test]
    fn empty_input() {
        assert!(order_of(vec![]).unwrap().is_empty());
    }

    #[test]
    fn linear_chain() {
        let order = order_of(vec![
            Task::new("Test", 1.0).after("Build"),
            Task::new("Build", 4.0).after("Design"),
            Task::new("Design", 2.0),
        ])
        .unwrap();
        assert_eq!(order, vec!["Design", "Build", "Test"]);
    }

    #[test]
    fn earlier_deadline_first() {
        let order = order_of(vec![
            Task::new("B", 1.0).due(t0() + Duration::days(5)),
            Task::new("A", 3.0).due(t0() + Duration::days(2)),
        ])
        .unwrap();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn undated_tasks_last() {
        let order = order_of(vec![
            Task::new("Open", 0.5),
            Task::new("Dated", 9.0).due(t0() + Duration::days(30)),
        ])
        .unwrap();
        assert_eq!(order, vec!["Dated", "Open"]);
    }

    #[test]
    fn shorter_first_then_input_order() {
        let order = order_of(vec![
            Task::new("Long", 5.0),
            Task::new("Mid", 2.0),
            Task::new("Short", 1.0),
            Task::new("Mid too", 2.0),
        ])
        .unwrap();
        assert_eq!(order, vec!["Short", "Mid", "Mid too", "Long"]);
    }

    #[test]
    fn dependency_overrides_urgency() {
        // Urgent depends on Prep, which has no deadline
        let order = order_of(vec![
            Task::new("Other", 1.0).due(t0() + Duration::days(3)),
            Task::new("Urgent", 1.0).due(t0() + Duration::days(1)).after("Prep"),
            Task::new("Prep", 2.0),
        ])
        .unwrap();
        assert_eq!(order, vec!["Other", "Prep", "Urgent"]);
    }

    #[test]
    fn newly_ready_task_competes_on_priority() {
        let order = order_of(vec![
            Task::new("Root", 1.0).due(t0() + Duration::days(1)),
            Task::new("Later", 1.0).due(t0() + Duration::days(9)),
            Task::new("Follow", 1.0).due(t0() + Duration::days(2)).after("Root"),
        ])
        .unwrap();
        assert_eq!(order, vec!["Root", "Follow", "Later"]);
    }

    #[test]
    fn mutual_dependency_is_a_cycle() {
        let result = order_of(vec![
            Task::new("A", 1.0).after("B"),
            Task::new("B", 1.0).after("A"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            ScheduleError::DependencyCycle(vec!["A".into(), "B".into()])
        );
    }

    #[test]
    fn cycle_reports_blocked_tasks_not_the_free_ones() {
        let result = order_of(vec![
            Task::new("Free", 1.0),
            Task::new("X", 1.0).after("Z"),
            Task::new("Y", 1.0).after("X"),
            Task::new("Z", 1.0).after("Y"),
            Task::new("Downstream", 1.0).after("Z").after("Free"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            ScheduleError::DependencyCycle(vec![
                "X".into(),
                "Y".into(),
                "Z".into(),
                "Downstream".into()
            ])
        );
    }

    #[test]
    fn diamond_is_topologically_valid() {
        let tasks = vec![
            Task::new("D", 1.0).after("B").after("C"),
            Task::new("C", 3.0).after("A"),
            Task::new("B", 2.0).after("A"),
            Task::new("A", 1.0),
        ];
        let order = order_of(tasks.clone()).unwrap();
        assert_eq!(order, vec!["A", "B", "C", "D"]);

        for task in &tasks {
            let pos = order.iter().position(|t| t == &task.title).unwrap();
            for dep in &task.dependencies {
                let dep_pos = order.iter().position(|t| t == dep).unwrap();
                assert!(dep_pos < pos, "{} must precede {}", dep, task.title);
            }
        }
    }
}
