//! Affected package selection
//!
//! Given a classified change scope, determine:
//! - Which packages directly changed (source vs. test-only)
//! - Which packages transitively depend on source-changed packages (strict mode)
//! - The final set of packages that need validation
//!
//! Test-only changes never propagate: nothing depends on a package's tests.

use super::closure::reflexive_closure;
use super::dependency_graph::DependencyGraph;
use crate::scope::ChangeScope;
use crate::workspace::ManifestSnapshot;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// How far a change propagates through the dependency graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  /// Only directly changed packages
  Quick,
  /// Directly changed packages plus every transitive dependent of a source change
  #[default]
  Strict,
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Mode::Quick => write!(f, "quick"),
      Mode::Strict => write!(f, "strict"),
    }
  }
}

/// Why the affected set has the packages it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
  /// `--all` override
  AllRequested,
  /// A root configuration change forced a whole-workspace run
  ForcedByRootConfig,
  /// Computed from the change scope
  Scoped(Mode),
}

/// Set of affected packages from file changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedSet {
  /// Packages with direct source (or other non-test) changes
  pub source: BTreeSet<String>,

  /// Packages with direct test changes
  pub tests: BTreeSet<String>,

  /// Packages pulled in only through the dependents closure
  pub dependents: BTreeSet<String>,

  /// Final set of package names requiring validation
  pub packages: BTreeSet<String>,

  pub selection: Selection,
}

impl AffectedSet {
  pub fn is_empty(&self) -> bool {
    self.packages.is_empty()
  }

  pub fn len(&self) -> usize {
    self.packages.len()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.packages.contains(name)
  }
}

/// Select the affected packages for a change scope.
///
/// `all` (or a root config change) short-circuits to every package. Otherwise quick mode
/// returns the directly changed packages, and strict mode adds the reflexive-transitive
/// closure of source changes under the dependents map.
pub fn select_affected(
  scope: &ChangeScope,
  snapshot: &ManifestSnapshot,
  graph: &DependencyGraph,
  mode: Mode,
  all: bool,
) -> AffectedSet {
  let source = snapshot.names_for_keys(&scope.source_changed);
  let tests = snapshot.names_for_keys(&scope.test_changed);

  if all || scope.force_all {
    return AffectedSet {
      source,
      tests,
      dependents: BTreeSet::new(),
      packages: snapshot.package_names(),
      selection: if all {
        Selection::AllRequested
      } else {
        Selection::ForcedByRootConfig
      },
    };
  }

  let mut packages = match mode {
    Mode::Quick => source.clone(),
    Mode::Strict => reflexive_closure(source.iter().cloned(), graph.dependents_map()),
  };
  let dependents: BTreeSet<String> = packages.difference(&source).cloned().collect();
  packages.extend(tests.iter().cloned());

  AffectedSet {
    source,
    tests,
    dependents,
    packages,
    selection: Selection::Scoped(mode),
  }
}
