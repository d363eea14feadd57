//! Graph-aware workspace analysis
//!
//! Plain ordered maps over package names for the dependency graph, a generic closure
//! routine for propagation, and petgraph only where a real graph algorithm (SCC) is
//! needed.

pub mod affected;
pub mod closure;
pub mod dependency_graph;

pub use affected::{AffectedSet, Mode, select_affected};
pub use dependency_graph::DependencyGraph;
