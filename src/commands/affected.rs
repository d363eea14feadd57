//! `prevalidate affected` - Show which packages a push would validate
//!
//! Runs the same change detection and planning as `run`, then prints:
//! - Which packages directly changed (source vs. test-only)
//! - Which packages are pulled in as dependents
//! - The stage plan, without executing it

use super::{ScopeOptions, changed_files, open_repo, resolve_base};
use crate::core::context::WorkspaceContext;
use crate::core::engine::Evaluation;
use crate::core::error::ValidateResult;
use crate::graph::DependencyGraph;
use serde::Serialize;
use std::str::FromStr;

/// Output format for affected command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
  NamesOnly,
}

impl FromStr for OutputFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(format!("Unknown format '{}'. Valid formats: text, json, names", s)),
    }
  }
}

#[derive(Serialize)]
struct AffectedReport<'a> {
  base: Option<&'a str>,
  #[serde(flatten)]
  evaluation: &'a Evaluation,
  summary: Summary,
}

#[derive(Serialize)]
struct Summary {
  changed_files_count: usize,
  source_count: usize,
  test_only_count: usize,
  dependents_count: usize,
  affected_count: usize,
}

/// Run the affected command
pub fn run_affected(ctx: &WorkspaceContext, options: &ScopeOptions, format: OutputFormat) -> ValidateResult<()> {
  let run_options = options.run_options(&ctx.config);

  let (base, changed) = if options.all {
    (None, Vec::new())
  } else {
    let git = open_repo(ctx)?;
    let base = resolve_base(&git, options, &ctx.config)?;
    if !options.no_fetch {
      git.fetch_base(&base)?;
    }
    let changed = changed_files(&git, &base, false)?;
    (Some(base), changed)
  };

  let evaluation = ctx.evaluate(&changed, &run_options);

  match format {
    OutputFormat::Text => display_text(&evaluation, &ctx.graph, base.as_deref()),
    OutputFormat::Json => display_json(&evaluation, base.as_deref())?,
    OutputFormat::NamesOnly => display_names_only(&evaluation),
  }
  Ok(())
}

/// Display results in human-readable text format
fn display_text(evaluation: &Evaluation, graph: &DependencyGraph, base: Option<&str>) {
  let affected = &evaluation.affected;

  println!("Affected Analysis ({} mode)", evaluation.mode);
  println!("==========================");
  println!();

  if let Some(base) = base {
    println!("Base: {}", base);
  }
  println!("Changed files: {}", evaluation.changed_files.len());
  if !evaluation.changed_files.is_empty() && evaluation.changed_files.len() <= 20 {
    for file in &evaluation.changed_files {
      println!("  {}", file);
    }
  }
  println!();

  if evaluation.scope.force_all {
    println!("⚠️  Root configuration changed: every package is affected");
    println!();
  }
  if evaluation.lint_only {
    println!("ℹ️  Lint-only scope (docs/scripts changes)");
    println!();
  }

  println!("Direct source changes: {} packages", affected.source.len());
  for name in &affected.source {
    let users: Vec<&str> = graph.dependents(name).collect();
    if users.is_empty() {
      println!("  📦 {}", name);
    } else {
      println!("  📦 {} (used by {})", name, users.join(", "));
    }
  }
  println!();

  if !affected.tests.is_empty() {
    println!("Test changes: {} packages", affected.tests.len());
    for name in &affected.tests {
      println!("  🧪 {}", name);
    }
    println!();
  }

  println!("Transitive dependents: {} packages", affected.dependents.len());
  for name in &affected.dependents {
    let via: Vec<&str> = graph.depends_on(name).filter(|dep| affected.contains(dep)).collect();
    println!("  ⬆  {} (via {})", name, via.join(", "));
  }
  println!();

  println!("Affected: {} packages", affected.len());
  for name in &affected.packages {
    println!("  🎯 {}", name);
  }
  println!();

  println!("Plan {}", evaluation.plan.id);
  for group in &evaluation.plan.groups {
    for stage in &group.stages {
      println!("  {:<12} {}", stage.stage.to_string(), stage.decision);
    }
  }
  for warning in &evaluation.plan.warnings {
    println!("  ⚠️  {}", warning);
  }
}

/// Display results in JSON format
fn display_json(evaluation: &Evaluation, base: Option<&str>) -> ValidateResult<()> {
  let affected = &evaluation.affected;
  let report = AffectedReport {
    base,
    evaluation,
    summary: Summary {
      changed_files_count: evaluation.changed_files.len(),
      source_count: affected.source.len(),
      test_only_count: affected.tests.difference(&affected.source).count(),
      dependents_count: affected.dependents.len(),
      affected_count: affected.len(),
    },
  };

  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}

/// Display only package names (the affected set)
fn display_names_only(evaluation: &Evaluation) {
  for name in &evaluation.affected.packages {
    println!("{}", name);
  }
}
