//! Change classification
//!
//! Maps a flat list of changed paths onto per-package source/test buckets plus the two
//! run-wide flags. Rules are applied per path (first match wins) and their effects
//! accumulate across paths:
//!
//! 1. `<packages_dir>/<key>/...` for a known package → source, test, or (anything else
//!    directly under the package) source. Unknown keys are ignored.
//! 2. Under a lint-only root (docs, tooling scripts) → lint-only candidate.
//! 3. Recognized top-level config file → force all.
//! 4. Top-level file shaped like config (dotfile, `*.config.<ext>`) → force all.
//! 5. Everything else is ignored.

use super::rules::ClassifierRules;
use crate::utils::normalize_separators;
use serde::Serialize;
use std::collections::BTreeSet;

/// How a single changed path was classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "package", rename_all = "snake_case")]
pub enum PathClass {
  /// Under a known package's source subtree
  Source(String),
  /// Under a known package's test subtree
  Test(String),
  /// Directly under a known package but outside src/test (manifest, README, ...)
  PackageOther(String),
  /// Under the packages root, but the directory is not a workspace package
  UnknownPackage(String),
  /// Under a docs/tooling root
  LintOnly,
  /// Recognized top-level configuration file
  RootConfig,
  /// Unrecognized top-level file that looks like tooling config
  RootConfigHeuristic,
  /// Irrelevant to validation scope
  Ignored,
}

/// Classification result for a whole change list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeScope {
  /// Local keys of packages with source (or other non-test) changes
  pub source_changed: BTreeSet<String>,

  /// Local keys of packages with test-only changes
  pub test_changed: BTreeSet<String>,

  /// Only docs/tooling paths changed: no package change, no root config change
  pub lint_only: bool,

  /// Every package must be treated as affected
  pub force_all: bool,
}

impl ChangeScope {
  /// Whether any package-level bucket is non-empty
  pub fn has_package_changes(&self) -> bool {
    !self.source_changed.is_empty() || !self.test_changed.is_empty()
  }
}

/// Classifies changed paths against the workspace's package directory keys.
pub struct ChangeClassifier<'a> {
  rules: &'a ClassifierRules,
  local_keys: BTreeSet<&'a str>,
}

impl<'a> ChangeClassifier<'a> {
  pub fn new(rules: &'a ClassifierRules, local_keys: impl IntoIterator<Item = &'a str>) -> Self {
    Self {
      rules,
      local_keys: local_keys.into_iter().collect(),
    }
  }

  /// Classify one path.
  pub fn classify_path(&self, path: &str) -> PathClass {
    let normalized = normalize_separators(path);
    let path = normalized.as_ref();

    if let Some(rest) = self.rules.strip_packages_root(path) {
      let mut segments = rest.split('/');
      let local_key = segments.next().unwrap_or_default();
      let area = segments.next().unwrap_or_default();

      if !self.local_keys.contains(local_key) {
        return PathClass::UnknownPackage(local_key.to_string());
      }

      let key = local_key.to_string();
      return if area == self.rules.source_dir {
        PathClass::Source(key)
      } else if area == self.rules.test_dir {
        PathClass::Test(key)
      } else {
        PathClass::PackageOther(key)
      };
    }

    if self.rules.is_lint_only_path(path) {
      return PathClass::LintOnly;
    }

    if path.contains('/') {
      return PathClass::Ignored;
    }

    if self.rules.is_recognized_root_config(path) {
      PathClass::RootConfig
    } else if self.rules.looks_like_root_config(path) {
      PathClass::RootConfigHeuristic
    } else {
      PathClass::Ignored
    }
  }

  /// Classify a whole change list into a [`ChangeScope`].
  pub fn classify<S: AsRef<str>>(&self, paths: &[S]) -> ChangeScope {
    let mut scope = ChangeScope::default();
    let mut tooling_touched = false;

    for path in paths {
      match self.classify_path(path.as_ref()) {
        PathClass::Source(key) | PathClass::PackageOther(key) => {
          scope.source_changed.insert(key);
        }
        PathClass::Test(key) => {
          scope.test_changed.insert(key);
        }
        PathClass::LintOnly => tooling_touched = true,
        PathClass::RootConfig | PathClass::RootConfigHeuristic => scope.force_all = true,
        PathClass::UnknownPackage(_) | PathClass::Ignored => {}
      }
    }

    scope.lint_only = tooling_touched && !scope.has_package_changes() && !scope.force_all;
    scope
  }
}
