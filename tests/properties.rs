//! Property tests for the scheduling engine
//!
//! Random edge sequences and task snapshots are checked against
//! independent reference computations (petgraph's own cycle check, plain
//! reachability and longest-path DP).

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use proptest::prelude::*;

use crewplan::domain::{DependencyGraph, GraphError, TaskId, TaskRef, WorkerId, WorkerRef};
use crewplan::engine::{AssignmentPolicy, RoundRobin, UrgencyRanker};

const MAX_TASKS: u32 = 12;

fn tid(n: u32) -> TaskId {
    TaskId::new(n)
}

fn edge_list() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((1..=MAX_TASKS, 1..=MAX_TASKS), 0..40)
}

/// Builds a graph by inserting every edge, ignoring rejected ones
fn build(edges: &[(u32, u32)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for n in 1..=MAX_TASKS {
        graph.add_task(tid(n));
    }
    for &(a, b) in edges {
        let _ = graph.add_edge(tid(a), tid(b));
    }
    graph
}

fn reachable(graph: &DependencyGraph, from: TaskId) -> BTreeSet<TaskId> {
    let mut seen = BTreeSet::new();
    let mut stack = graph.dependents(from);
    while let Some(node) = stack.pop() {
        if node != from && seen.insert(node) {
            stack.extend(graph.dependents(node));
        }
    }
    seen
}

/// Longest path length in edges, by memoized DFS
fn longest_from(graph: &DependencyGraph, node: TaskId, memo: &mut HashMap<TaskId, usize>) -> usize {
    if let Some(&known) = memo.get(&node) {
        return known;
    }
    let best = graph
        .dependents(node)
        .into_iter()
        .map(|next| longest_from(graph, next, memo) + 1)
        .max()
        .unwrap_or(0);
    memo.insert(node, best);
    best
}

fn task(id: u32, urgency: u8, day: u32) -> TaskRef {
    let deadline = NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
    TaskRef::new(tid(id), format!("Task {}", id), urgency, deadline)
}

proptest! {
    #[test]
    fn rejects_exactly_the_edges_petgraph_calls_cyclic(edges in edge_list()) {
        let mut graph = DependencyGraph::new();
        let mut shadow: DiGraphMap<u32, ()> = DiGraphMap::new();
        for n in 1..=MAX_TASKS {
            graph.add_task(tid(n));
            shadow.add_node(n);
        }

        for (a, b) in edges {
            let before = graph.edges();
            let fresh = shadow.add_edge(a, b, ()).is_none();
            let cyclic = is_cyclic_directed(&shadow);
            if cyclic && fresh {
                shadow.remove_edge(a, b);
            }

            match graph.add_edge(tid(a), tid(b)) {
                Ok(()) => prop_assert!(!cyclic),
                Err(GraphError::CycleDetected(x, y)) => {
                    prop_assert!(cyclic);
                    prop_assert_eq!((x, y), (tid(a), tid(b)));
                    prop_assert_eq!(graph.edges(), before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
            prop_assert!(!graph.detect_cycle());
        }
    }

    #[test]
    fn topological_order_respects_every_edge(edges in edge_list()) {
        let graph = build(&edges);
        let order = graph.topological_sort();
        prop_assert_eq!(order.len(), graph.len());

        let position: HashMap<_, _> = order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        for edge in graph.edges() {
            prop_assert!(position[&edge.prerequisite] < position[&edge.dependent]);
        }
    }

    #[test]
    fn critical_path_is_a_longest_path(edges in edge_list()) {
        let graph = build(&edges);
        let path = graph.critical_path().unwrap();

        for pair in path.windows(2) {
            prop_assert!(graph.has_edge(pair[0], pair[1]));
        }

        let mut memo = HashMap::new();
        let longest = graph
            .task_ids()
            .map(|id| longest_from(&graph, id, &mut memo))
            .max()
            .unwrap_or(0);
        prop_assert_eq!(path.len() - 1, longest);
    }

    #[test]
    fn impact_is_reachability(edges in edge_list(), start in 1..=MAX_TASKS) {
        let graph = build(&edges);
        prop_assert_eq!(graph.impact(tid(start)), reachable(&graph, tid(start)));
    }

    #[test]
    fn rollback_preserves_traversal_order(edges in edge_list()) {
        // Replaying only the accepted edges must give the same graph,
        // including the order traversals visit neighbours in.
        let graph = build(&edges);
        let replayed = build(
            &graph
                .edges()
                .iter()
                .map(|e| (e.prerequisite.value(), e.dependent.value()))
                .collect::<Vec<_>>(),
        );
        prop_assert_eq!(graph.topological_sort(), replayed.topological_sort());
        prop_assert_eq!(graph.critical_path().unwrap(), replayed.critical_path().unwrap());
    }

    #[test]
    fn top_k_leaves_extraction_order_unchanged(
        specs in prop::collection::vec((1u8..=5, 1u32..=28), 1..30),
        k in 0usize..35,
    ) {
        let mut ranker = UrgencyRanker::with_capacity(64);
        let mut control = UrgencyRanker::with_capacity(64);
        for (i, (urgency, day)) in specs.iter().enumerate() {
            ranker.insert(task(i as u32 + 1, *urgency, *day)).unwrap();
            control.insert(task(i as u32 + 1, *urgency, *day)).unwrap();
        }

        let top = ranker.top_k(k);
        prop_assert_eq!(top.len(), k.min(specs.len()));
        prop_assert_eq!(ranker.top_k(k), top.clone());

        let drained = ranker.into_sorted_vec();
        prop_assert_eq!(&drained[..top.len()], &top[..]);
        prop_assert_eq!(drained, control.into_sorted_vec());
    }

    #[test]
    fn round_robin_counts_differ_by_at_most_one(tasks in 0u32..60, workers in 1u32..9) {
        let snapshot: Vec<_> = (1..=tasks).map(|i| task(i, 3, 1)).collect();
        let crew: Vec<_> = (1..=workers)
            .map(|i| WorkerRef { id: WorkerId::new(i), name: format!("W{}", i), load: 0 })
            .collect();

        let assignments = RoundRobin::new(16).assign(&snapshot, &crew).unwrap();
        prop_assert_eq!(assignments.len(), tasks as usize);

        let mut counts: HashMap<WorkerId, usize> = crew.iter().map(|w| (w.id, 0)).collect();
        for a in &assignments {
            *counts.get_mut(&a.worker).unwrap() += 1;
        }
        let max = counts.values().max().copied().unwrap_or(0);
        let min = counts.values().min().copied().unwrap_or(0);
        prop_assert!(max - min <= 1);
        prop_assert_eq!(counts.values().sum::<usize>(), tasks as usize);
    }
}
