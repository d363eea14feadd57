//! Data-driven path rules for change classification
//!
//! Every directory name and root configuration file the classifier recognizes lives
//! here, in one list each. Adding a new shared tooling file to a workspace means
//! adding one string to `root_config_files`, not another conditional.

use crate::core::error::{ConfigError, ValidateResult};
use serde::{Deserialize, Serialize};

/// Path layout and root-config rules used by the change classifier.
///
/// Deserialized from the `[layout]` table of `prevalidate.toml`; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
  /// Directory holding one subdirectory per package (e.g. "packages")
  pub packages_dir: String,

  /// Source subtree inside a package
  pub source_dir: String,

  /// Test subtree inside a package
  pub test_dir: String,

  /// Top-level directories whose changes only warrant a lint pass
  pub lint_only_roots: Vec<String>,

  /// Exact names of top-level files that force a whole-workspace run
  pub root_config_files: Vec<String>,

  /// Suffixes that mark an unrecognized top-level file as root tooling config
  pub root_config_suffixes: Vec<String>,

  /// Treat any top-level dotfile as root tooling config
  pub dotfiles_force_all: bool,
}

impl Default for ClassifierRules {
  fn default() -> Self {
    Self {
      packages_dir: "packages".to_string(),
      source_dir: "src".to_string(),
      test_dir: "test".to_string(),
      lint_only_roots: strings(&["docs", "scripts"]),
      root_config_files: strings(&[
        "package.json",
        "pnpm-lock.yaml",
        "pnpm-workspace.yaml",
        "tsconfig.json",
        "tsconfig.base.json",
        "tsconfig.build.json",
        "vitest.workspace.ts",
        "biome.json",
        "biome.jsonc",
        "lerna.json",
      ]),
      root_config_suffixes: strings(&[".config.js", ".config.cjs", ".config.mjs", ".config.ts"]),
      dotfiles_force_all: true,
    }
  }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

impl ClassifierRules {
  /// Strip `<packages_dir>/` from a path, returning the remainder.
  pub fn strip_packages_root<'p>(&self, path: &'p str) -> Option<&'p str> {
    path.strip_prefix(self.packages_dir.as_str())?.strip_prefix('/')
  }

  /// Whether a path lives under one of the lint-only roots.
  pub fn is_lint_only_path(&self, path: &str) -> bool {
    self
      .lint_only_roots
      .iter()
      .any(|root| path.strip_prefix(root.as_str()).is_some_and(|rest| rest.starts_with('/')))
  }

  /// Whether a top-level file name is one of the recognized root config files.
  pub fn is_recognized_root_config(&self, name: &str) -> bool {
    self.root_config_files.iter().any(|known| known == name)
  }

  /// Heuristic: does an unrecognized top-level file look like root tooling config?
  ///
  /// Matches dotfiles (when enabled) and `*.config.{js,cjs,mjs,ts}` style names. This is
  /// deliberately loose; new tooling files at the root are assumed to affect everything.
  pub fn looks_like_root_config(&self, name: &str) -> bool {
    (self.dotfiles_force_all && name.starts_with('.'))
      || self.root_config_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
  }

  /// Validate the rules (directory names must be non-empty single segments)
  pub fn validate(&self) -> ValidateResult<()> {
    for (field, value) in [
      ("layout.packages_dir", &self.packages_dir),
      ("layout.source_dir", &self.source_dir),
      ("layout.test_dir", &self.test_dir),
    ] {
      if value.is_empty() || value.contains('/') || value.contains('\\') {
        return Err(
          ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a single directory name, got '{}'", value),
          }
          .into(),
        );
      }
    }

    if self.source_dir == self.test_dir {
      return Err(
        ConfigError::InvalidValue {
          field: "layout.test_dir".to_string(),
          reason: "must differ from layout.source_dir".to_string(),
        }
        .into(),
      );
    }

    if let Some(root) = self
      .lint_only_roots
      .iter()
      .find(|r| r.is_empty() || r.contains('/') || r.contains('\\'))
    {
      return Err(
        ConfigError::InvalidValue {
          field: "layout.lint_only_roots".to_string(),
          reason: format!("expected a single directory name, got '{}'", root),
        }
        .into(),
      );
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lint_only_roots_need_directory_boundary() {
    let rules = ClassifierRules::default();
    assert!(rules.is_lint_only_path("docs/readme.md"));
    assert!(rules.is_lint_only_path("scripts/release/bump.mjs"));
    assert!(!rules.is_lint_only_path("docs"));
    assert!(!rules.is_lint_only_path("docsite/index.md"));
  }

  #[test]
  fn test_recognized_root_configs() {
    let rules = ClassifierRules::default();
    assert!(rules.is_recognized_root_config("pnpm-lock.yaml"));
    assert!(rules.is_recognized_root_config("tsconfig.build.json"));
    assert!(!rules.is_recognized_root_config("README.md"));
  }

  // Heuristic, not a contract: these shapes are assumed to be tooling config today.
  #[test]
  fn test_root_config_heuristic_shapes() {
    let rules = ClassifierRules::default();
    assert!(rules.looks_like_root_config(".nvmrc"));
    assert!(rules.looks_like_root_config("eslint.config.mjs"));
    assert!(rules.looks_like_root_config("vite.config.ts"));
    assert!(!rules.looks_like_root_config("README.md"));
    assert!(!rules.looks_like_root_config("config.json"));

    let no_dotfiles = ClassifierRules {
      dotfiles_force_all: false,
      ..Default::default()
    };
    assert!(!no_dotfiles.looks_like_root_config(".nvmrc"));
  }

  #[test]
  fn test_strip_packages_root() {
    let rules = ClassifierRules::default();
    assert_eq!(rules.strip_packages_root("packages/api/src/a.ts"), Some("api/src/a.ts"));
    assert_eq!(rules.strip_packages_root("packagesx/api"), None);
    assert_eq!(rules.strip_packages_root("packages"), None);
  }

  #[test]
  fn test_validate_rejects_nested_dirs() {
    let rules = ClassifierRules {
      source_dir: "lib/src".to_string(),
      ..Default::default()
    };
    assert!(rules.validate().is_err());

    let same = ClassifierRules {
      test_dir: "src".to_string(),
      ..Default::default()
    };
    assert!(same.validate().is_err());

    assert!(ClassifierRules::default().validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_lint_only_roots_with_separators() {
    for bad in ["docs/", "tools/scripts", "", "docs\\"] {
      let rules = ClassifierRules {
        lint_only_roots: vec!["scripts".to_string(), bad.to_string()],
        ..Default::default()
      };
      let err = rules.validate().unwrap_err();
      assert!(err.to_string().contains("layout.lint_only_roots"), "{}", err);
    }
  }
}
