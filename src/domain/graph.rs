//! Dependency graph for tasks
//!
//! Validates a raw task set and indexes it for scheduling. Tasks live in a
//! petgraph arena; node indices follow input order, and edges run from a
//! dependency to its dependent.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use tracing::debug;

use super::error::ScheduleError;
use super::task::Task;

/// A validated dependency graph for one scheduling request
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph, edge: dependency -> dependent
    graph: DiGraph<Task, ()>,

    /// Map from title to node index
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Builds a graph from the tasks of a request
    ///
    /// Duplicate titles are checked across the whole input first; the
    /// remaining checks run task by task in input order and the first
    /// violation wins.
    pub fn build(tasks: Vec<Task>) -> Result<Self, ScheduleError> {
        let mut graph = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut node_map = HashMap::with_capacity(tasks.len());

        // First pass: add all nodes
        for task in tasks {
            if node_map.contains_key(&task.title) {
                return Err(ScheduleError::DuplicateTitle(task.title));
            }
            let title = task.title.clone();
            let idx = graph.add_node(task);
            node_map.insert(title, idx);
        }

        // Second pass: validate and add all edges
        for idx in graph.node_indices() {
            let task = &graph[idx];

            if !task.estimated_hours.is_finite() || task.estimated_hours < 0.0 {
                return Err(ScheduleError::InvalidEstimate {
                    task: task.title.clone(),
                    hours: task.estimated_hours,
                });
            }

            let mut edges = Vec::with_capacity(task.dependencies.len());
            for dep in &task.dependencies {
                if dep == &task.title {
                    return Err(ScheduleError::SelfDependency(task.title.clone()));
                }
                let dep_idx = node_map.get(dep).ok_or_else(|| ScheduleError::UnknownDependency {
                    task: task.title.clone(),
                    missing: dep.clone(),
                })?;
                edges.push(*dep_idx);
            }

            for dep_idx in edges {
                // update_edge keeps a repeated dependency to a single edge
                graph.update_edge(dep_idx, idx, ());
            }
        }

        debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );

        Ok(Self { graph, node_map })
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns true if the graph contains a task with this title
    pub fn contains(&self, title: &str) -> bool {
        self.node_map.contains_key(title)
    }

    /// Looks up a task by title
    pub fn task(&self, title: &str) -> Option<&Task> {
        self.node_map.get(title).map(|idx| &self.graph[*idx])
    }

    /// Position of a task in the original input
    pub fn input_index(&self, title: &str) -> Option<usize> {
        self.node_map.get(title).map(|idx| idx.index())
    }

    /// Tasks in input order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Number of dependencies a task waits for
    pub fn in_degree(&self, title: &str) -> usize {
        self.node_map
            .get(title)
            .map(|idx| self.in_degree_at(*idx))
            .unwrap_or(0)
    }

    /// Direct dependencies of a task, in input order
    pub fn dependencies(&self, title: &str) -> Vec<&str> {
        self.neighbors_by_title(title, Direction::Incoming)
    }

    /// Direct dependents of a task (tasks that wait for it), in input order
    pub fn dependents(&self, title: &str) -> Vec<&str> {
        self.neighbors_by_title(title, Direction::Outgoing)
    }

    fn neighbors_by_title(&self, title: &str, direction: Direction) -> Vec<&str> {
        let Some(idx) = self.node_map.get(title) else {
            return vec![];
        };

        let mut neighbors: Vec<_> = self.graph.neighbors_directed(*idx, direction).collect();
        neighbors.sort();
        neighbors
            .into_iter()
            .map(|n| self.graph[n].title.as_str())
            .collect()
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub(crate) fn task_at(&self, idx: NodeIndex) -> &Task {
        &self.graph[idx]
    }

    pub(crate) fn in_degree_at(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors_directed(idx, Direction::Incoming).count()
    }

    pub(crate) fn dependents_at(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    pub(crate) fn dependencies_at(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Incoming)
    }

    pub(crate) fn index_of(&self, title: &str) -> Option<NodeIndex> {
        self.node_map.get(title).copied()
    }
}
