//! Unified workspace context - build once, pass everywhere
//!
//! ```text
//! main.rs:
//!   WorkspaceContext::build() -> &WorkspaceContext
//!   |
//!   v
//! commands/run.rs, affected.rs:
//!   fn run_*(ctx: &WorkspaceContext, ...)
//! ```

use crate::core::config::PrevalidateConfig;
use crate::core::engine::{EngineInputs, Evaluation, RunOptions, evaluate};
use crate::core::error::ValidateResult;
use crate::graph::DependencyGraph;
use crate::workspace::{ManifestSnapshot, load_workspace};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared workspace-level data: config, manifest snapshot and dependency graph.
///
/// Built once at startup; the snapshot and graph are immutable for the rest of the run.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
  /// Workspace root directory
  pub root: PathBuf,

  /// prevalidate.toml (defaults when absent)
  pub config: Arc<PrevalidateConfig>,

  /// Workspace packages read from their manifests
  pub snapshot: ManifestSnapshot,

  /// Dependency graph (built from the snapshot)
  pub graph: Arc<DependencyGraph>,
}

impl WorkspaceContext {
  /// Build workspace context from a root directory.
  ///
  /// Loads config, reads every package manifest under the packages root, and builds the
  /// dependency graph. Cycles are logged and otherwise tolerated.
  pub fn build(workspace_root: &Path) -> ValidateResult<Self> {
    let root = workspace_root.to_path_buf();
    let config = PrevalidateConfig::load(&root)?;
    let snapshot = load_workspace(&root, &config.layout.packages_dir)?;
    Ok(Self::from_parts(root, config, snapshot))
  }

  /// Assemble a context from already-loaded parts
  pub fn from_parts(root: PathBuf, config: PrevalidateConfig, snapshot: ManifestSnapshot) -> Self {
    let graph = DependencyGraph::build(&snapshot);

    tracing::debug!(
      packages = snapshot.len(),
      edges = graph.edge_count(),
      "built dependency graph"
    );
    for cycle in graph.cycles() {
      tracing::warn!(packages = %cycle.join(" → "), "workspace dependency cycle");
    }

    Self {
      root,
      config: Arc::new(config),
      snapshot,
      graph: Arc::new(graph),
    }
  }

  /// Run the selection pipeline against this workspace
  pub fn evaluate(&self, changed: &[String], options: &RunOptions) -> Evaluation {
    evaluate(
      EngineInputs {
        snapshot: &self.snapshot,
        graph: &self.graph,
        rules: &self.config.layout,
        test_script: &self.config.scripts.test,
      },
      changed,
      options,
    )
  }
}
