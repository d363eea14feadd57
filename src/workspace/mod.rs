//! Workspace manifest snapshot
//!
//! The engine never reads the filesystem. It works from a [`ManifestSnapshot`]: one
//! immutable [`Package`] per workspace package, indexed by both its local directory key
//! and its package name. The [`loader`] module builds one from `package.json` files.

pub mod loader;

use crate::core::error::{ConfigError, ValidateResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub use loader::load_workspace;

/// A workspace package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
  /// Workspace-unique package name (e.g. "@scope/api")
  pub name: String,

  /// Directory name under the packages root (e.g. "api")
  pub local_key: String,

  /// Declared dependencies on other workspace packages, by name
  pub workspace_dependencies: BTreeSet<String>,

  /// Script identifiers the package declares (e.g. "build", "test:unit")
  pub scripts: BTreeSet<String>,
}

impl Package {
  pub fn new(name: impl Into<String>, local_key: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      local_key: local_key.into(),
      workspace_dependencies: BTreeSet::new(),
      scripts: BTreeSet::new(),
    }
  }

  /// Builder-style: add workspace dependencies by name
  pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.workspace_dependencies.extend(deps.into_iter().map(Into::into));
    self
  }

  /// Builder-style: add available scripts
  pub fn with_scripts<I, S>(mut self, scripts: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.scripts.extend(scripts.into_iter().map(Into::into));
    self
  }

  pub fn has_script(&self, script: &str) -> bool {
    self.scripts.contains(script)
  }
}

/// Immutable set of workspace packages, indexed by local key and by name.
#[derive(Debug, Clone, Default)]
pub struct ManifestSnapshot {
  by_key: BTreeMap<String, Package>,
  name_to_key: BTreeMap<String, String>,
}

impl ManifestSnapshot {
  /// Build a snapshot, rejecting empty names and duplicate names or keys.
  pub fn new(packages: impl IntoIterator<Item = Package>) -> ValidateResult<Self> {
    let mut snapshot = Self::default();

    for package in packages {
      if package.name.trim().is_empty() {
        return Err(
          ConfigError::InvalidValue {
            field: format!("name of package '{}'", package.local_key),
            reason: "package name must not be empty".to_string(),
          }
          .into(),
        );
      }
      if snapshot.by_key.contains_key(&package.local_key) {
        return Err(
          ConfigError::DuplicateLocalKey {
            key: package.local_key,
          }
          .into(),
        );
      }
      if let Some(first) = snapshot.name_to_key.get(&package.name) {
        return Err(
          ConfigError::DuplicatePackage {
            name: package.name.clone(),
            first: first.clone(),
            second: package.local_key,
          }
          .into(),
        );
      }

      snapshot.name_to_key.insert(package.name.clone(), package.local_key.clone());
      snapshot.by_key.insert(package.local_key.clone(), package);
    }

    Ok(snapshot)
  }

  /// All packages, ordered by local key
  pub fn packages(&self) -> impl Iterator<Item = &Package> {
    self.by_key.values()
  }

  /// All local directory keys
  pub fn local_keys(&self) -> impl Iterator<Item = &str> {
    self.by_key.keys().map(String::as_str)
  }

  /// All package names, sorted
  pub fn package_names(&self) -> BTreeSet<String> {
    self.name_to_key.keys().cloned().collect()
  }

  pub fn by_local_key(&self, key: &str) -> Option<&Package> {
    self.by_key.get(key)
  }

  pub fn by_name(&self, name: &str) -> Option<&Package> {
    self.name_to_key.get(name).and_then(|key| self.by_key.get(key))
  }

  pub fn contains_name(&self, name: &str) -> bool {
    self.name_to_key.contains_key(name)
  }

  /// Translate local directory keys to package names; unknown keys are dropped.
  pub fn names_for_keys<'k>(&self, keys: impl IntoIterator<Item = &'k String>) -> BTreeSet<String> {
    keys
      .into_iter()
      .filter_map(|key| self.by_local_key(key))
      .map(|pkg| pkg.name.clone())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.by_key.len()
  }
}
