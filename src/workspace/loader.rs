//! Node.js workspace manifest loader
//!
//! Reads `<root>/<packages_dir>/*/package.json` and turns each into a [`Package`]:
//! - name: the manifest's `name` (required, fatal when missing)
//! - local key: the package's directory name
//! - workspace dependencies: entries of dependencies / devDependencies /
//!   peerDependencies / optionalDependencies using the `workspace:` protocol
//! - scripts: keys of `scripts`
//!
//! Directories without a `package.json` are skipped.

use super::{ManifestSnapshot, Package};
use crate::core::error::{ConfigError, ResultExt, ValidateResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const MANIFEST_FILE: &str = "package.json";
const WORKSPACE_PROTOCOL: &str = "workspace:";

/// package.json structure (minimal fields we care about)
#[derive(Debug, Deserialize)]
struct PackageJson {
  #[serde(default)]
  name: Option<Value>,
  #[serde(default)]
  dependencies: BTreeMap<String, Value>,
  #[serde(default, rename = "devDependencies")]
  dev_dependencies: BTreeMap<String, Value>,
  #[serde(default, rename = "peerDependencies")]
  peer_dependencies: BTreeMap<String, Value>,
  #[serde(default, rename = "optionalDependencies")]
  optional_dependencies: BTreeMap<String, Value>,
  #[serde(default)]
  scripts: BTreeMap<String, Value>,
}

impl PackageJson {
  /// Names of dependencies declared with the `workspace:` protocol, across all sections.
  fn workspace_dependencies(&self) -> impl Iterator<Item = &String> {
    [
      &self.dependencies,
      &self.dev_dependencies,
      &self.peer_dependencies,
      &self.optional_dependencies,
    ]
    .into_iter()
    .flat_map(|section| section.iter())
    .filter(|(_, spec)| spec.as_str().is_some_and(|s| s.starts_with(WORKSPACE_PROTOCOL)))
    .map(|(name, _)| name)
  }
}

/// Load the workspace manifest snapshot from `<root>/<packages_dir>`.
pub fn load_workspace(root: &Path, packages_dir: &str) -> ValidateResult<ManifestSnapshot> {
  let packages_root = root.join(packages_dir);
  if !packages_root.is_dir() {
    return Err(ConfigError::PackagesDirMissing { path: packages_root }.into());
  }

  let mut entries: Vec<_> = fs::read_dir(&packages_root)
    .with_context(|| format!("Failed to read {}", packages_root.display()))?
    .collect::<Result<_, _>>()?;
  entries.sort_by_key(|entry| entry.file_name());

  let mut packages = Vec::new();
  for entry in entries {
    let dir = entry.path();
    if !dir.is_dir() {
      continue;
    }
    let Some(local_key) = entry.file_name().to_str().map(str::to_string) else {
      debug!(path = %dir.display(), "skipping non-UTF-8 package directory");
      continue;
    };

    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
      debug!(package = %local_key, "no package.json, skipping");
      continue;
    }

    let content = fs::read_to_string(&manifest_path)
      .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let package = parse_manifest(&content, &local_key).map_err(|reason| ConfigError::InvalidManifest {
      path: manifest_path.clone(),
      reason,
    })?;

    debug!(
      package = %package.name,
      local_key = %package.local_key,
      deps = package.workspace_dependencies.len(),
      scripts = package.scripts.len(),
      "loaded package manifest"
    );
    packages.push(package);
  }

  ManifestSnapshot::new(packages)
}

/// Parse one package.json body into a [`Package`].
fn parse_manifest(content: &str, local_key: &str) -> Result<Package, String> {
  let manifest: PackageJson = serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))?;

  let name = match &manifest.name {
    Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
    _ => return Err("missing or non-string \"name\" field".to_string()),
  };

  Ok(
    Package::new(name, local_key)
      .with_dependencies(manifest.workspace_dependencies().cloned())
      .with_scripts(manifest.scripts.keys().cloned()),
  )
}
