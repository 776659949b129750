//! Traversal of the change DAG.
//!
//! Breadth-first walks over dependency links, used to answer "what does
//! this set of heads cover" and "what depends on these changes".

use std::collections::{HashMap, HashSet, VecDeque};

use super::ChangeGraph;
use crate::types::ChangeHash;

/// Collect every known change reachable from `start` through deps,
/// including the start hashes themselves.
///
/// Unknown hashes are skipped.
///
/// # Algorithm Complexity
/// * **Time**: O(V + E) over the visited changes and their dep links
/// * **Space**: O(V) for the visited set and queue
pub(crate) fn ancestors(graph: &ChangeGraph, start: &[ChangeHash]) -> HashSet<ChangeHash> {
    let mut visited = HashSet::new();
    let mut queue: VecDeque<ChangeHash> = start.iter().copied().collect();

    while let Some(hash) = queue.pop_front() {
        if visited.contains(&hash) {
            continue;
        }
        let Some(change) = graph.get(&hash) else {
            continue;
        };
        visited.insert(hash);
        for dep in change.deps() {
            if !visited.contains(dep) {
                queue.push_back(*dep);
            }
        }
    }

    visited
}

/// Collect the transitive dependents of `roots` within the graph, not
/// including the roots.
///
/// # Algorithm Complexity
/// * **Time**: O(V + E) to build the reverse index plus the walk
/// * **Space**: O(V + E) for the reverse index
pub(crate) fn dependents(graph: &ChangeGraph, roots: &[ChangeHash]) -> HashSet<ChangeHash> {
    let mut children: HashMap<ChangeHash, Vec<ChangeHash>> = HashMap::new();
    for change in graph.iter() {
        for dep in change.deps() {
            children.entry(*dep).or_default().push(change.hash());
        }
    }

    let mut found = HashSet::new();
    let mut queue: VecDeque<ChangeHash> = roots.iter().copied().collect();
    while let Some(hash) = queue.pop_front() {
        for child in children.get(&hash).into_iter().flatten() {
            if found.insert(*child) {
                queue.push_back(*child);
            }
        }
    }
    found
}

/// Hashes in `heads` not known to the graph, sorted.
pub(crate) fn missing(graph: &ChangeGraph, heads: &[ChangeHash]) -> Vec<ChangeHash> {
    let mut missing: Vec<ChangeHash> = heads
        .iter()
        .filter(|h| !graph.contains(h))
        .copied()
        .collect();
    missing.sort();
    missing.dedup();
    missing
}
