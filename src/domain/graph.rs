//! Dependency graph for tasks
//!
//! Manages prerequisite -> dependent edges with cycle detection, topological
//! ordering, critical path and downstream impact queries. Storage is a
//! petgraph `DiGraphMap`, which keeps vertices and each vertex's dependents
//! in insertion order; the traversals are written out here so their
//! ordering and tie-breaking rules stay under our control.
//!
//! The graph is kept acyclic: an edge is inserted, the whole graph is
//! re-checked, and the edge is rolled back if a cycle appeared.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::id::TaskId;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Adding dependency would create a cycle: {0} -> {1}")]
    CycleDetected(TaskId, TaskId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Dependency graph contains a cycle")]
    Cyclic,
}

/// A dependency edge: `prerequisite` must complete before `dependent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub prerequisite: TaskId,
    pub dependent: TaskId,
}

impl Edge {
    pub fn new(prerequisite: TaskId, dependent: TaskId) -> Self {
        Self {
            prerequisite,
            dependent,
        }
    }
}

/// A dependency graph for tasks
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Edge direction is prerequisite -> dependent
    graph: DiGraphMap<TaskId, ()>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraphMap::new(),
        }
    }

    /// Builds a graph from task ids and previously accepted edges
    ///
    /// Every edge goes through [`add_edge`](Self::add_edge) in the order
    /// given. Edges it refuses (a missing task, or one that would close a
    /// cycle) are left out and handed back with the reason, so the caller
    /// decides whether that is fatal.
    pub fn from_parts<'a>(
        tasks: impl IntoIterator<Item = TaskId>,
        edges: impl IntoIterator<Item = &'a Edge>,
    ) -> (Self, Vec<(Edge, GraphError)>) {
        let mut graph = Self::new();
        let mut rejected = Vec::new();

        for task in tasks {
            graph.add_task(task);
        }

        for edge in edges {
            if let Err(e) = graph.add_edge(edge.prerequisite, edge.dependent) {
                rejected.push((*edge, e));
            }
        }

        (graph, rejected)
    }

    /// Adds a task to the graph
    pub fn add_task(&mut self, task: TaskId) {
        self.graph.add_node(task);
    }

    /// Removes a task from the graph (and all its edges)
    pub fn remove_task(&mut self, task: TaskId) -> bool {
        self.graph.remove_node(task)
    }

    /// Adds a dependency edge: `dependent` waits on `prerequisite`
    ///
    /// Fails with [`GraphError::CycleDetected`] if the edge would close a
    /// cycle (a self edge included); the graph is left exactly as it was.
    /// Re-adding an existing edge is a no-op.
    pub fn add_edge(&mut self, prerequisite: TaskId, dependent: TaskId) -> Result<(), GraphError> {
        if !self.graph.contains_node(prerequisite) {
            return Err(GraphError::TaskNotFound(prerequisite));
        }
        if !self.graph.contains_node(dependent) {
            return Err(GraphError::TaskNotFound(dependent));
        }
        if self.graph.contains_edge(prerequisite, dependent) {
            return Ok(());
        }

        self.graph.add_edge(prerequisite, dependent, ());

        if self.detect_cycle() {
            // The edge was appended last, so removing it restores the
            // adjacency lists to their previous order.
            self.graph.remove_edge(prerequisite, dependent);
            debug!(%prerequisite, %dependent, "rolled back edge that closed a cycle");
            return Err(GraphError::CycleDetected(prerequisite, dependent));
        }

        Ok(())
    }

    /// Removes a dependency edge; returns false if it was not there
    pub fn remove_edge(&mut self, prerequisite: TaskId, dependent: TaskId) -> bool {
        self.graph.remove_edge(prerequisite, dependent).is_some()
    }

    /// Returns true if the edge exists
    pub fn has_edge(&self, prerequisite: TaskId, dependent: TaskId) -> bool {
        self.graph.contains_edge(prerequisite, dependent)
    }

    /// Depth-first search for a back edge
    ///
    /// `on_stack` holds the vertices of the current DFS path; reaching one
    /// of them again means the graph has a cycle.
    pub fn detect_cycle(&self) -> bool {
        let mut visited: HashSet<TaskId> = HashSet::with_capacity(self.len());
        let mut on_stack: HashSet<TaskId> = HashSet::new();

        for root in self.graph.nodes() {
            if !visited.insert(root) {
                continue;
            }

            on_stack.insert(root);
            let mut stack = vec![(root, self.graph.neighbors(root))];

            while let Some((node, neighbors)) = stack.last_mut() {
                let node = *node;
                match neighbors.next() {
                    Some(next) if on_stack.contains(&next) => return true,
                    Some(next) => {
                        if visited.insert(next) {
                            on_stack.insert(next);
                            stack.push((next, self.graph.neighbors(next)));
                        }
                    }
                    None => {
                        on_stack.remove(&node);
                        stack.pop();
                    }
                }
            }
        }

        false
    }

    /// Kahn's algorithm
    ///
    /// The result is shorter than [`len`](Self::len) exactly when the graph
    /// has a cycle; vertices on or behind the cycle never reach in-degree 0.
    pub fn topological_sort(&self) -> Vec<TaskId> {
        let mut in_degree: HashMap<TaskId, usize> =
            self.graph.nodes().map(|node| (node, 0)).collect();

        for (_, dependent, _) in self.graph.all_edges() {
            *in_degree.entry(dependent).or_default() += 1;
        }

        let mut queue: VecDeque<TaskId> = self
            .graph
            .nodes()
            .filter(|node| in_degree[node] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);

            for next in self.graph.neighbors(node) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }

        order
    }

    /// Longest path (counted in edges) through the graph
    ///
    /// Ties are broken towards lower task ids: the path ends at the lowest
    /// id among the farthest vertices, and a vertex reachable at equal
    /// distance from two predecessors keeps the lower one. An empty graph
    /// yields an empty path.
    pub fn critical_path(&self) -> Result<Vec<TaskId>, GraphError> {
        if self.detect_cycle() {
            return Err(GraphError::Cyclic);
        }

        let order = self.topological_sort();
        let mut distance: HashMap<TaskId, usize> = order.iter().map(|&node| (node, 0)).collect();
        let mut predecessor: HashMap<TaskId, TaskId> = HashMap::new();

        for &node in &order {
            let candidate = distance[&node] + 1;

            for next in self.graph.neighbors(node) {
                let current = distance[&next];
                let longer = candidate > current;
                let same_but_lower = candidate == current
                    && predecessor.get(&next).is_some_and(|&prev| node < prev);

                if longer || same_but_lower {
                    distance.insert(next, candidate);
                    predecessor.insert(next, node);
                }
            }
        }

        let Some(end) = order
            .iter()
            .copied()
            .max_by(|a, b| distance[a].cmp(&distance[b]).then_with(|| b.cmp(a)))
        else {
            return Ok(Vec::new());
        };

        let mut path = vec![end];
        let mut current = end;
        while let Some(&prev) = predecessor.get(&current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();

        Ok(path)
    }

    /// Every task transitively depending on `task`, excluding `task` itself
    ///
    /// An unknown task has no dependents.
    pub fn impact(&self, task: TaskId) -> BTreeSet<TaskId> {
        let mut affected = BTreeSet::new();
        if !self.graph.contains_node(task) {
            return affected;
        }

        let mut queue = VecDeque::from([task]);
        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors(node) {
                if next != task && affected.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        affected
    }

    /// Returns the direct prerequisites of a task
    pub fn dependencies(&self, task: TaskId) -> Vec<TaskId> {
        if !self.graph.contains_node(task) {
            return vec![];
        }

        self.graph
            .neighbors_directed(task, petgraph::Direction::Incoming)
            .collect()
    }

    /// Returns the direct dependents of a task (tasks that wait on it)
    pub fn dependents(&self, task: TaskId) -> Vec<TaskId> {
        if !self.graph.contains_node(task) {
            return vec![];
        }

        self.graph.neighbors(task).collect()
    }

    /// Returns every edge
    ///
    /// Edges come back in insertion order until one is removed; removal
    /// moves the newest edge into the freed slot.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .all_edges()
            .map(|(prerequisite, dependent, _)| Edge::new(prerequisite, dependent))
            .collect()
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task: TaskId) -> bool {
        self.graph.contains_node(task)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns all task IDs in the graph
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.graph.nodes()
    }
}
