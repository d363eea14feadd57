//! Intra-workspace dependency graph
//!
//! Two maps over package names, built once from the manifest snapshot:
//!
//! - `depends_on[a]`: workspace packages `a` declares as dependencies
//! - `dependents[a]`: workspace packages that declare `a` (the exact inverse)
//!
//! Dependencies on names outside the workspace are dropped, and self-dependencies are
//! no-ops. Cycles are accepted here; [`DependencyGraph::cycles`] reports them for
//! diagnostics only.

use crate::workspace::ManifestSnapshot;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};

type Adjacency = BTreeMap<String, BTreeSet<String>>;

/// Forward and reverse dependency maps over workspace package names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
  depends_on: Adjacency,
  dependents: Adjacency,
}

impl DependencyGraph {
  /// Build the graph from a manifest snapshot.
  ///
  /// Every package gets an entry in both maps, even with no edges.
  pub fn build(snapshot: &ManifestSnapshot) -> Self {
    let mut graph = Self::default();

    for package in snapshot.packages() {
      graph.depends_on.entry(package.name.clone()).or_default();
      graph.dependents.entry(package.name.clone()).or_default();
    }

    for package in snapshot.packages() {
      for dep in &package.workspace_dependencies {
        if dep == &package.name || !snapshot.contains_name(dep) {
          continue;
        }
        graph
          .depends_on
          .entry(package.name.clone())
          .or_default()
          .insert(dep.clone());
        graph
          .dependents
          .entry(dep.clone())
          .or_default()
          .insert(package.name.clone());
      }
    }

    graph
  }

  /// Reverse map: package → workspace packages depending on it
  pub fn dependents_map(&self) -> &Adjacency {
    &self.dependents
  }

  /// Direct workspace dependencies of a package (empty for unknown names)
  pub fn depends_on(&self, name: &str) -> impl Iterator<Item = &str> {
    self.depends_on.get(name).into_iter().flatten().map(String::as_str)
  }

  /// Direct dependents of a package (empty for unknown names)
  pub fn dependents(&self, name: &str) -> impl Iterator<Item = &str> {
    self.dependents.get(name).into_iter().flatten().map(String::as_str)
  }

  /// Number of dependency edges
  pub fn edge_count(&self) -> usize {
    self.depends_on.values().map(BTreeSet::len).sum()
  }

  /// Detect dependency cycles using Tarjan's SCC algorithm.
  ///
  /// Returns each strongly connected component with more than one package, members sorted.
  pub fn cycles(&self) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for name in self.depends_on.keys() {
      nodes.insert(name.as_str(), graph.add_node(name.as_str()));
    }
    for (from, deps) in &self.depends_on {
      for to in deps {
        if let (Some(&a), Some(&b)) = (nodes.get(from.as_str()), nodes.get(to.as_str())) {
          graph.add_edge(a, b, ());
        }
      }
    }

    let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .map(|component| {
        let mut names: Vec<String> = component.into_iter().map(|idx| graph[idx].to_string()).collect();
        names.sort();
        names
      })
      .collect();
    cycles.sort();
    cycles
  }
}
