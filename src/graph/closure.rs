//! Reflexive-transitive closure over an adjacency map
//!
//! Knows nothing about packages: nodes are any ordered, cloneable keys. Breadth-first
//! over a visited set, so every node is expanded at most once and cycles terminate.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Every node reachable from `seeds` by following `edges`, seeds included.
///
/// Nodes missing from `edges` are treated as having no outgoing edges.
pub fn reflexive_closure<N, I>(seeds: I, edges: &BTreeMap<N, BTreeSet<N>>) -> BTreeSet<N>
where
  N: Ord + Clone,
  I: IntoIterator<Item = N>,
{
  let mut visited: BTreeSet<N> = BTreeSet::new();
  let mut queue: VecDeque<N> = VecDeque::new();

  for seed in seeds {
    if visited.insert(seed.clone()) {
      queue.push_back(seed);
    }
  }

  while let Some(current) = queue.pop_front() {
    let Some(next) = edges.get(&current) else {
      continue;
    };
    for neighbor in next {
      if visited.insert(neighbor.clone()) {
        queue.push_back(neighbor.clone());
      }
    }
  }

  visited
}
