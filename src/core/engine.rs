//! Pure selection pipeline
//!
//! ```text
//! changed paths ─▶ ChangeClassifier ─▶ ChangeScope
//!                                          │
//! ManifestSnapshot ─▶ DependencyGraph ─────┴─▶ select_affected ─▶ AffectedSet
//!                                                                    │
//!                                              plan_stages ◀─────────┘
//!                                                   │
//!                                                   ▼
//!                                            ValidationPlan
//! ```
//!
//! No filesystem, git, or process access happens here. Identical inputs always produce
//! an identical [`Evaluation`].

use crate::core::plan::{PlannerInput, StageOrder, ValidationPlan, plan_stages};
use crate::graph::{AffectedSet, DependencyGraph, Mode, select_affected};
use crate::scope::{ChangeClassifier, ChangeScope, ClassifierRules};
use crate::workspace::ManifestSnapshot;
use serde::Serialize;

/// Per-run options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
  pub mode: Mode,
  /// Validate every package regardless of changes
  pub all: bool,
  /// Largest affected set still tested per package
  pub max_packages: usize,
  pub order: StageOrder,
}

impl Default for RunOptions {
  fn default() -> Self {
    Self {
      mode: Mode::Strict,
      all: false,
      max_packages: 8,
      order: StageOrder::Normal,
    }
  }
}

/// Everything computed for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
  pub mode: Mode,
  pub changed_files: Vec<String>,
  pub scope: ChangeScope,
  /// Net lint-only flag after the `all` override
  pub lint_only: bool,
  pub affected: AffectedSet,
  pub plan: ValidationPlan,
}

/// Borrowed workspace state the pipeline runs against
#[derive(Debug, Clone, Copy)]
pub struct EngineInputs<'a> {
  pub snapshot: &'a ManifestSnapshot,
  pub graph: &'a DependencyGraph,
  pub rules: &'a ClassifierRules,
  pub test_script: &'a str,
}

/// Classify, select and plan.
///
/// With `all` set, `changed` is ignored and may be empty.
pub fn evaluate(inputs: EngineInputs<'_>, changed: &[String], options: &RunOptions) -> Evaluation {
  let scope = if options.all {
    ChangeScope::default()
  } else {
    ChangeClassifier::new(inputs.rules, inputs.snapshot.local_keys()).classify(changed)
  };

  let affected = select_affected(&scope, inputs.snapshot, inputs.graph, options.mode, options.all);
  let lint_only = scope.lint_only && !options.all;

  let plan = plan_stages(&PlannerInput {
    affected: &affected,
    lint_only,
    mode: options.mode,
    max_packages: options.max_packages,
    order: options.order,
    snapshot: inputs.snapshot,
    test_script: inputs.test_script,
  });

  Evaluation {
    mode: options.mode,
    changed_files: if options.all { Vec::new() } else { changed.to_vec() },
    scope,
    lint_only,
    affected,
    plan,
  }
}
