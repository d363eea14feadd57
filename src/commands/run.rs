//! `prevalidate run` - Pre-push validation scoped to the affected packages
//!
//! Steps, in order:
//! 1. Fetch: resolve the base ref and refresh it (unless `--no-fetch`)
//! 2. Detect scope: diff against the merge-base, classify, select, plan
//! 3. The planned stage groups (lint ∥ typecheck, build, unit tests), or build first
//!    with `--ci-order`
//!
//! `--dry-run` still reads git state but prints stage commands instead of spawning them.

use super::{ScopeOptions, changed_files, open_repo, resolve_base};
use crate::core::context::WorkspaceContext;
use crate::core::engine::Evaluation;
use crate::core::error::ValidateResult;
use crate::exec::{CommandRunner, DryRunRunner, SystemRunner, execute_plan};
use crate::ui::{Tone, output, paint};
use std::time::Instant;

/// Run the validation command
pub fn run_validation(ctx: &WorkspaceContext, options: &ScopeOptions, dry_run: bool, verbose: bool) -> ValidateResult<()> {
  let started = Instant::now();
  output::banner(&format!("Pre-push validation ({} mode)", options.mode));

  let git = open_repo(ctx)?;

  let base = output::step("Fetch", || -> ValidateResult<String> {
    let base = resolve_base(&git, options, &ctx.config)?;
    output::info(&format!("Base ref: {}", paint(Tone::Info, &base)));

    if options.no_fetch {
      output::skipped("Fetch", "--no-fetch");
    } else if dry_run {
      println!("⏭️  {} {}", paint(Tone::Muted, "[dry-run]"), fetch_command(&base));
    } else {
      git.fetch_base(&base)?;
    }
    Ok(base)
  })?;

  let run_options = options.run_options(&ctx.config);
  let evaluation = output::step("Detect scope", || -> ValidateResult<Evaluation> {
    if options.all {
      output::info("--all enabled; all packages affected.");
    }
    let changed = changed_files(&git, &base, options.all)?;
    let evaluation = ctx.evaluate(&changed, &run_options);
    report_scope(&evaluation, verbose);
    Ok(evaluation)
  })?;

  tracing::debug!(plan = %evaluation.plan.id, "validation plan ready");
  if evaluation.plan.is_noop() {
    output::info("Every stage is skipped for this scope.");
  }

  let system = SystemRunner::new(&ctx.root, verbose);
  let runner: &dyn CommandRunner = if dry_run { &DryRunRunner } else { &system };
  execute_plan(&evaluation.plan, &ctx.config.commands, &ctx.config.scripts.test, runner)?;

  output::elapsed("All validation steps passed in", started.elapsed());
  Ok(())
}

fn fetch_command(base: &str) -> String {
  match base.split_once('/') {
    Some((remote, _)) if !remote.is_empty() => format!("git fetch --quiet {}", remote),
    _ => "git fetch --quiet".to_string(),
  }
}

fn report_scope(evaluation: &Evaluation, verbose: bool) {
  if verbose {
    for path in &evaluation.changed_files {
      output::info(&format!("changed: {}", paint(Tone::Muted, path)));
    }
  }

  tracing::debug!(
    changed = evaluation.changed_files.len(),
    source = evaluation.scope.source_changed.len(),
    tests = evaluation.scope.test_changed.len(),
    lint_only = evaluation.lint_only,
    force_all = evaluation.scope.force_all,
    "classified changes"
  );

  output::info(&format!("Changed files: {}", evaluation.changed_files.len()));
  output::info(&format!("Affected packages: {}", evaluation.affected.len()));
  if verbose {
    for name in &evaluation.affected.packages {
      output::info(&format!("  📦 {}", name));
    }
  }
  if evaluation.scope.force_all {
    output::info("Root configuration changed; validating every package.");
  }
  if evaluation.lint_only {
    output::info("Lint-only scope detected (docs/scripts changes).");
  }
  if evaluation.affected.is_empty() && !evaluation.lint_only {
    output::info("No package-impacting changes detected.");
  }
}
