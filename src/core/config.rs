use crate::core::error::{ConfigError, ResultExt, ValidateError, ValidateResult};
use crate::scope::ClassifierRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for prevalidate
/// Searched in order: prevalidate.toml, .prevalidate.toml, .config/prevalidate.toml
///
/// The file is optional; every table and field has a default matching a pnpm workspace
/// with `packages/<name>/{src,test}` layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrevalidateConfig {
  pub defaults: DefaultsConfig,
  pub layout: ClassifierRules,
  pub scripts: ScriptsConfig,
  pub commands: CommandsConfig,
}

/// Defaults for flags the CLI can override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
  /// Base ref used when no upstream is configured (default: "origin/unstable")
  pub base: String,

  /// Largest affected set still tested per package (default: 8)
  pub max_packages: usize,
}

impl Default for DefaultsConfig {
  fn default() -> Self {
    Self {
      base: "origin/unstable".to_string(),
      max_packages: 8,
    }
  }
}

/// Package script names the planner inspects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
  /// Script a package must declare to be included in scoped tests
  pub test: String,
}

impl Default for ScriptsConfig {
  fn default() -> Self {
    Self {
      test: "test:unit".to_string(),
    }
  }
}

/// External commands for each stage
///
/// Each stage command is a list of arguments passed to `runner`. A scoped test run is
/// `<runner> -r <filter_flag> <pkg>... run <scripts.test>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
  pub runner: String,
  pub lint: Vec<String>,
  pub typecheck: Vec<String>,
  pub build: Vec<String>,
  pub test: Vec<String>,
  pub filter_flag: String,
}

impl Default for CommandsConfig {
  fn default() -> Self {
    Self {
      runner: "pnpm".to_string(),
      lint: vec!["lint".to_string()],
      typecheck: vec!["check-types".to_string()],
      build: vec!["build".to_string()],
      test: vec!["test:unit".to_string()],
      filter_flag: "--filter".to_string(),
    }
  }
}

impl CommandsConfig {
  fn validate(&self) -> ValidateResult<()> {
    if self.runner.trim().is_empty() {
      return Err(invalid("commands.runner", "must not be empty"));
    }
    for (field, args) in [
      ("commands.lint", &self.lint),
      ("commands.typecheck", &self.typecheck),
      ("commands.build", &self.build),
      ("commands.test", &self.test),
    ] {
      if args.is_empty() {
        return Err(invalid(field, "must name at least one argument"));
      }
    }
    if self.filter_flag.trim().is_empty() {
      return Err(invalid("commands.filter_flag", "must not be empty"));
    }
    Ok(())
  }
}

fn invalid(field: &str, reason: &str) -> ValidateError {
  ConfigError::InvalidValue {
    field: field.to_string(),
    reason: reason.to_string(),
  }
  .into()
}

impl PrevalidateConfig {
  /// Find config file in search order: prevalidate.toml, .prevalidate.toml, .config/prevalidate.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("prevalidate.toml"),
      path.join(".prevalidate.toml"),
      path.join(".config").join("prevalidate.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the workspace root, falling back to defaults when no file exists
  pub fn load(path: &Path) -> ValidateResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| ConfigError::Malformed {
      path: config_path.clone(),
      reason: e.to_string(),
    })?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Parse config from TOML text without validating it
  pub fn parse(content: &str) -> Result<Self, toml_edit::de::Error> {
    toml_edit::de::from_str(content)
  }

  /// Validate all tables
  pub fn validate(&self) -> ValidateResult<()> {
    if self.defaults.max_packages == 0 {
      return Err(invalid("defaults.max_packages", "must be a positive integer"));
    }
    if self.defaults.base.trim().is_empty() {
      return Err(invalid("defaults.base", "must not be empty"));
    }
    if self.scripts.test.trim().is_empty() {
      return Err(invalid("scripts.test", "must not be empty"));
    }
    self.layout.validate()?;
    self.commands.validate()
  }
}
