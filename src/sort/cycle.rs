//! Cycle detection and heuristic breaking for the phased dependency sort
//! (spec §4.3). Real schemas contain cycles — mutual foreign keys, recursive
//! views — so an unbreakable cycle is only reported once soft-edge removal
//! has genuinely failed to linearize the graph.

use std::collections::BTreeSet;

use super::Edge;

/// A dependency cycle the sort could not break. Carries the change indices
/// on the cycle (in the original, pre-sort order they appeared in the
/// phase's step list) and the still-standing edges that produced it, so a
/// caller can render a precise error.
#[derive(Debug, Clone)]
pub struct CycleError {
    pub node_indices: Vec<usize>,
    pub edges: Vec<(usize, usize)>,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dependency cycle detected among changes {:?}; surviving edges: {:?}",
            self.node_indices, self.edges
        )
    }
}

impl std::error::Error for CycleError {}

/// Finds strongly connected components of size > 1 (or a single node with a
/// self-loop) using an iterative (non-recursive) Tarjan's algorithm — deep
/// schemas make a recursive version a stack-overflow risk.
pub fn find_cyclic_sccs(node_count: usize, edges: &[Edge]) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for edge in edges {
        adjacency[edge.from].push(edge.to);
    }

    let mut index_of: Vec<Option<usize>> = vec![None; node_count];
    let mut lowlink: Vec<usize> = vec![0; node_count];
    let mut on_stack: Vec<bool> = vec![false; node_count];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;
    let mut sccs: Vec<Vec<usize>> = Vec::new();

    // Explicit work-stack Tarjan: each frame is (node, next child index to visit).
    for start in 0..node_count {
        if index_of[start].is_some() {
            continue;
        }
        let mut work: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(&(v, child_idx)) = work.last() {
            if index_of[v].is_none() {
                index_of[v] = Some(next_index);
                lowlink[v] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v] = true;
            }

            if child_idx < adjacency[v].len() {
                let w = adjacency[v][child_idx];
                work.last_mut().unwrap().1 += 1;
                if index_of[w].is_none() {
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index_of[w].unwrap());
                }
            } else {
                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v] == index_of[v].unwrap() {
                    let mut component = Vec::new();
                    loop {
                        let w = stack.pop().unwrap();
                        on_stack[w] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    if component.len() > 1 || adjacency[v].contains(&v) {
                        sccs.push(component);
                    }
                }
            }
        }
    }

    sccs
}

/// Rotates a cycle's node list to begin at its smallest index, so that the
/// same cycle reappearing after a filtering pass is recognized as "the same
/// cycle" rather than treated as new.
pub fn normalize_signature(mut nodes: Vec<usize>) -> Vec<usize> {
    if nodes.is_empty() {
        return nodes;
    }
    nodes.sort_unstable();
    nodes.dedup();
    let min_pos = nodes
        .iter()
        .enumerate()
        .min_by_key(|(_, &n)| n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    nodes.rotate_left(min_pos);
    nodes
}

/// Attempts to break every detected cycle by discarding its soft edges.
/// Returns the surviving edge list, or a [`CycleError`] if the same cycle
/// signature reappears after filtering (soft-edge removal did not help) or
/// the bounded iteration count is exceeded.
pub fn break_cycles(node_count: usize, mut edges: Vec<Edge>) -> Result<Vec<Edge>, CycleError> {
    let mut seen_signatures: BTreeSet<Vec<usize>> = BTreeSet::new();
    let max_iterations = node_count.max(1);

    for _ in 0..max_iterations {
        let sccs = find_cyclic_sccs(node_count, &edges);
        if sccs.is_empty() {
            return Ok(edges);
        }

        let mut removed_any = false;
        let mut hard_edges_in_cycles: Vec<(usize, usize)> = Vec::new();
        let mut cyclic_nodes: Vec<usize> = Vec::new();

        for component in &sccs {
            let members: BTreeSet<usize> = component.iter().copied().collect();
            let signature = normalize_signature(component.clone());

            let (soft, hard): (Vec<&Edge>, Vec<&Edge>) = edges
                .iter()
                .filter(|e| members.contains(&e.from) && members.contains(&e.to))
                .partition(|e| e.soft);

            if soft.is_empty() {
                // Nothing left to try for this component; record it as fatal
                // unless a different component still has progress to make.
                hard_edges_in_cycles.extend(hard.iter().map(|e| (e.from, e.to)));
                cyclic_nodes.extend(component.iter().copied());
                continue;
            }

            if seen_signatures.contains(&signature) {
                hard_edges_in_cycles.extend(hard.iter().map(|e| (e.from, e.to)));
                cyclic_nodes.extend(component.iter().copied());
                continue;
            }
            seen_signatures.insert(signature);

            let soft_set: BTreeSet<(usize, usize)> = soft.iter().map(|e| (e.from, e.to)).collect();
            edges.retain(|e| !soft_set.contains(&(e.from, e.to)));
            removed_any = true;
        }

        if !removed_any {
            cyclic_nodes.sort_unstable();
            cyclic_nodes.dedup();
            return Err(CycleError {
                node_indices: cyclic_nodes,
                edges: hard_edges_in_cycles,
            });
        }
    }

    Err(CycleError {
        node_indices: (0..node_count).collect(),
        edges: edges.iter().map(|e| (e.from, e.to)).collect(),
    })
}
