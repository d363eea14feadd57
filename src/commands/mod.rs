//! CLI commands for prevalidate
//!
//! - **run**: Full pre-push validation (fetch, detect scope, run planned stages)
//! - **affected**: Print the scope decision and plan without running stages
//!
//! Both accept `&WorkspaceContext` plus the shared [`ScopeOptions`].

pub mod affected;
pub mod run;

pub use affected::{OutputFormat, run_affected};
pub use run::run_validation;

use crate::core::config::PrevalidateConfig;
use crate::core::context::WorkspaceContext;
use crate::core::engine::RunOptions;
use crate::core::error::ValidateResult;
use crate::core::plan::StageOrder;
use crate::core::vcs::SystemGit;
use crate::graph::Mode;

/// Scope flags shared by `run` and `affected`
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
  pub mode: Mode,
  /// Explicit base ref (`--base`)
  pub base: Option<String>,
  pub all: bool,
  /// `--max-packages`, overriding the config file
  pub max_packages: Option<usize>,
  pub ci_order: bool,
  pub no_fetch: bool,
}

impl ScopeOptions {
  /// Merge CLI flags over config defaults
  pub fn run_options(&self, config: &PrevalidateConfig) -> RunOptions {
    RunOptions {
      mode: self.mode,
      all: self.all,
      max_packages: self.max_packages.unwrap_or(config.defaults.max_packages),
      order: if self.ci_order {
        StageOrder::Ci
      } else {
        StageOrder::Normal
      },
    }
  }
}

/// Base ref: `--base`, else the branch upstream, else the configured fallback
pub(crate) fn resolve_base(git: &SystemGit, options: &ScopeOptions, config: &PrevalidateConfig) -> ValidateResult<String> {
  if let Some(base) = &options.base {
    return Ok(base.clone());
  }
  if let Some(upstream) = git.upstream_ref()? {
    return Ok(upstream);
  }
  Ok(config.defaults.base.clone())
}

/// Open the repository and warn when the workspace root is not its top level
pub(crate) fn open_repo(ctx: &WorkspaceContext) -> ValidateResult<SystemGit> {
  let git = SystemGit::open(&ctx.root)?;
  let same_root = match (git.work_tree().canonicalize(), ctx.root.canonicalize()) {
    (Ok(a), Ok(b)) => a == b,
    _ => true,
  };
  if !same_root {
    tracing::warn!(
      work_tree = %git.work_tree().display(),
      root = %ctx.root.display(),
      "workspace root is not the repository root; changed paths may not match packages"
    );
  }
  Ok(git)
}

/// Changed paths since `base`, or none when every package is selected anyway
pub(crate) fn changed_files(git: &SystemGit, base: &str, all: bool) -> ValidateResult<Vec<String>> {
  if all {
    return Ok(Vec::new());
  }
  git.changed_files_since(base)
}
