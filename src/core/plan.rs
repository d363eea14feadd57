//! Validation plan: which stages run, which skip, which fall back to a global run
//!
//! The planner is pure. It turns the affected set and scope flags into an ordered list of
//! stage groups, and the executor later maps each decision onto a command invocation:
//!
//! ```text
//! AffectedSet + lint-only + options
//!   ↓
//! ValidationPlan (groups of StagePlan, warnings, PlanId)
//!   ↓
//! Executor (lint ∥ typecheck, then build, then tests)
//! ```
//!
//! Lint, typecheck and build are always workspace-global when they run; only the test
//! stage is scoped per package.

use crate::graph::{AffectedSet, Mode};
use crate::workspace::ManifestSnapshot;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// A validation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
  Lint,
  Typecheck,
  Build,
  Test,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Stage::Lint => write!(f, "Lint"),
      Stage::Typecheck => write!(f, "Typecheck"),
      Stage::Build => write!(f, "Build"),
      Stage::Test => write!(f, "Unit tests"),
    }
  }
}

/// Relative order of the build and lint/typecheck groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOrder {
  /// Lint + typecheck, then build, then tests
  #[default]
  Normal,
  /// Build first, as CI does
  Ci,
}

/// Why a stage is skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  /// No package-impacting and no lint-only changes
  NothingChanged,
  /// Only docs/tooling paths changed
  LintOnlyScope,
  /// Build is disabled in quick mode
  QuickMode,
  /// None of the affected packages declares the test script
  NoTestablePackages,
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SkipReason::NothingChanged => write!(f, "no package-impacting changes"),
      SkipReason::LintOnlyScope => write!(f, "lint-only scope"),
      SkipReason::QuickMode => write!(f, "disabled in --quick mode"),
      SkipReason::NoTestablePackages => write!(f, "no affected package has a test script"),
    }
  }
}

/// Decision for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StageDecision {
  /// Run the stage once for the whole workspace
  Run,
  /// Run the stage once, filtered to these packages
  RunScoped { packages: Vec<String> },
  /// Too many packages for a scoped run; run unscoped instead
  GlobalFallback { affected: usize, max_packages: usize },
  /// Do not run the stage
  Skip { reason: SkipReason },
}

impl StageDecision {
  pub fn is_skip(&self) -> bool {
    matches!(self, StageDecision::Skip { .. })
  }
}

impl fmt::Display for StageDecision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StageDecision::Run => write!(f, "run"),
      StageDecision::RunScoped { packages } => write!(f, "run ({} packages)", packages.len()),
      StageDecision::GlobalFallback { affected, max_packages } => {
        write!(f, "global fallback ({} > {} packages)", affected, max_packages)
      }
      StageDecision::Skip { reason } => write!(f, "skip: {}", reason),
    }
  }
}

/// A stage and its decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagePlan {
  pub stage: Stage,
  pub decision: StageDecision,
}

/// Stages that are dispatched together and jointly awaited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageGroup {
  pub name: String,
  pub stages: Vec<StagePlan>,
}

impl StageGroup {
  /// Stages in this group that will actually run
  pub fn runnable(&self) -> impl Iterator<Item = &StagePlan> {
    self.stages.iter().filter(|plan| !plan.decision.is_skip())
  }
}

/// Non-fatal planning notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
  /// Affected package has no test script and is left out of the test stage
  MissingTestScript { package: String, script: String },
}

impl fmt::Display for PlanWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PlanWarning::MissingTestScript { package, script } => {
        write!(f, "{} has no {} script; skipping", package, script)
      }
    }
  }
}

/// Ordered validation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationPlan {
  pub id: PlanId,
  pub order: StageOrder,
  pub groups: Vec<StageGroup>,
  pub warnings: Vec<PlanWarning>,
}

impl ValidationPlan {
  /// Decision for a stage
  #[cfg(test)]
  pub fn decision(&self, stage: Stage) -> Option<&StageDecision> {
    self
      .groups
      .iter()
      .flat_map(|group| group.stages.iter())
      .find(|plan| plan.stage == stage)
      .map(|plan| &plan.decision)
  }

  /// Whether every stage is skipped
  pub fn is_noop(&self) -> bool {
    self.groups.iter().all(|group| group.runnable().next().is_none())
  }
}

/// Inputs to the stage planner
#[derive(Debug, Clone)]
pub struct PlannerInput<'a> {
  pub affected: &'a AffectedSet,
  pub lint_only: bool,
  pub mode: Mode,
  pub max_packages: usize,
  pub order: StageOrder,
  pub snapshot: &'a ManifestSnapshot,
  pub test_script: &'a str,
}

/// Decide every stage.
pub fn plan_stages(input: &PlannerInput<'_>) -> ValidationPlan {
  let affected = input.affected;
  let nothing = affected.is_empty();
  let mut warnings = Vec::new();

  let lint = if nothing && !input.lint_only {
    skip(SkipReason::NothingChanged)
  } else {
    StageDecision::Run
  };

  let typecheck = if input.lint_only {
    skip(SkipReason::LintOnlyScope)
  } else if nothing {
    skip(SkipReason::NothingChanged)
  } else {
    StageDecision::Run
  };

  let build = if input.mode == Mode::Quick {
    skip(SkipReason::QuickMode)
  } else if input.lint_only {
    skip(SkipReason::LintOnlyScope)
  } else if nothing {
    skip(SkipReason::NothingChanged)
  } else {
    StageDecision::Run
  };

  let test = plan_tests(input, &mut warnings);

  let static_checks = StageGroup {
    name: "Lint + Typecheck".to_string(),
    stages: vec![
      StagePlan {
        stage: Stage::Lint,
        decision: lint,
      },
      StagePlan {
        stage: Stage::Typecheck,
        decision: typecheck,
      },
    ],
  };
  let build = single(Stage::Build, build);
  let tests = single(Stage::Test, test);

  let groups = match input.order {
    StageOrder::Normal => vec![static_checks, build, tests],
    StageOrder::Ci => vec![build, static_checks, tests],
  };

  let id = PlanId::from_contents(format!("{:?}|{:?}|{:?}", input.order, groups, warnings).as_bytes());
  ValidationPlan {
    id,
    order: input.order,
    groups,
    warnings,
  }
}

fn plan_tests(input: &PlannerInput<'_>, warnings: &mut Vec<PlanWarning>) -> StageDecision {
  let affected = input.affected;
  if input.lint_only {
    return skip(SkipReason::LintOnlyScope);
  }
  if affected.is_empty() {
    return skip(SkipReason::NothingChanged);
  }
  if affected.len() > input.max_packages {
    return StageDecision::GlobalFallback {
      affected: affected.len(),
      max_packages: input.max_packages,
    };
  }

  let mut testable = Vec::new();
  for name in &affected.packages {
    let Some(package) = input.snapshot.by_name(name) else {
      continue;
    };
    if package.has_script(input.test_script) {
      testable.push(name.clone());
    } else {
      warnings.push(PlanWarning::MissingTestScript {
        package: name.clone(),
        script: input.test_script.to_string(),
      });
    }
  }

  if testable.is_empty() {
    skip(SkipReason::NoTestablePackages)
  } else {
    StageDecision::RunScoped { packages: testable }
  }
}

fn skip(reason: SkipReason) -> StageDecision {
  StageDecision::Skip { reason }
}

fn single(stage: Stage, decision: StageDecision) -> StageGroup {
  StageGroup {
    name: stage.to_string(),
    stages: vec![StagePlan { stage, decision }],
  }
}
