//! Stable Kahn's algorithm: among all zero-in-degree nodes, always emit the
//! smallest index first. This preserves the logical pre-sort's order as a
//! tie-break, so equivalent inputs keep producing byte-identical plans.

use std::collections::BTreeSet;

use super::Edge;

/// Returns node indices in a valid topological order, or panics-free `None`
/// if the graph still has a cycle (callers are expected to have run
/// [`super::cycle::break_cycles`] first, making this an internal-invariant
/// check rather than a user-facing error path).
pub fn stable_toposort(node_count: usize, edges: &[Edge]) -> Option<Vec<usize>> {
    let mut in_degree = vec![0usize; node_count];
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for edge in edges {
        adjacency[edge.from].push(edge.to);
        in_degree[edge.to] += 1;
    }

    let mut ready: BTreeSet<usize> = (0..node_count)
        .filter(|&n| in_degree[n] == 0)
        .collect();
    let mut order = Vec::with_capacity(node_count);

    while let Some(&node) = ready.iter().next() {
        ready.remove(&node);
        order.push(node);
        for &neighbor in &adjacency[node] {
            in_degree[neighbor] -= 1;
            if in_degree[neighbor] == 0 {
                ready.insert(neighbor);
            }
        }
    }

    if order.len() == node_count {
        Some(order)
    } else {
        None
    }
}
