//! Error types for prevalidate with contextual messages and exit codes
//!
//! Every error belongs to a category that decides the process exit code, and most
//! categories carry a help message that points the user toward a fix.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for prevalidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, manifests, invalid args)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// A validation stage failed
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for prevalidate
#[derive(Debug)]
pub enum ValidateError {
  /// Configuration and manifest errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Validation stage failures
  Stage(StageError),

  /// I/O errors
  Io(io::Error),

  /// I/O error annotated with what was being attempted
  IoContext { context: String, source: io::Error },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ValidateError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ValidateError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ValidateError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ValidateError::Message { message, context, help } => ValidateError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ValidateError::Io(source) => ValidateError::IoContext {
        context: ctx_str,
        source,
      },
      ValidateError::IoContext { context, source } => ValidateError::IoContext {
        context: format!("{}\n{}", ctx_str, context),
        source,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ValidateError::Config(_) => ExitCode::User,
      ValidateError::Git(_) => ExitCode::System,
      ValidateError::Stage(_) => ExitCode::Validation,
      ValidateError::Io(_) | ValidateError::IoContext { .. } => ExitCode::System,
      ValidateError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ValidateError::Config(e) => e.help_message(),
      ValidateError::Git(e) => e.help_message(),
      ValidateError::Stage(e) => e.help_message(),
      ValidateError::Message { help, .. } => help.clone(),
      ValidateError::Io(_) | ValidateError::IoContext { .. } => None,
    }
  }
}

impl fmt::Display for ValidateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidateError::Config(e) => write!(f, "{}", e),
      ValidateError::Git(e) => write!(f, "{}", e),
      ValidateError::Stage(e) => write!(f, "{}", e),
      ValidateError::Io(e) => write!(f, "I/O error: {}", e),
      ValidateError::IoContext { context, source } => write!(f, "{}\nI/O error: {}", context, source),
      ValidateError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ValidateError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ValidateError::Io(e) | ValidateError::IoContext { source: e, .. } => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ValidateError {
  fn from(err: io::Error) -> Self {
    ValidateError::Io(err)
  }
}

impl From<String> for ValidateError {
  fn from(msg: String) -> Self {
    ValidateError::message(msg)
  }
}

impl From<&str> for ValidateError {
  fn from(msg: &str) -> Self {
    ValidateError::message(msg)
  }
}

impl From<ConfigError> for ValidateError {
  fn from(err: ConfigError) -> Self {
    ValidateError::Config(err)
  }
}

impl From<GitError> for ValidateError {
  fn from(err: GitError) -> Self {
    ValidateError::Git(err)
  }
}

impl From<StageError> for ValidateError {
  fn from(err: StageError) -> Self {
    ValidateError::Stage(err)
  }
}

impl From<toml_edit::de::Error> for ValidateError {
  fn from(err: toml_edit::de::Error) -> Self {
    ValidateError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ValidateError {
  fn from(err: serde_json::Error) -> Self {
    ValidateError::message(format!("JSON error: {}", err))
  }
}

/// Configuration and workspace manifest errors
#[derive(Debug)]
pub enum ConfigError {
  /// The packages root directory does not exist
  PackagesDirMissing { path: PathBuf },

  /// A package.json could not be parsed or lacks its identity
  InvalidManifest { path: PathBuf, reason: String },

  /// Two packages declare the same name
  DuplicatePackage {
    name: String,
    first: String,
    second: String,
  },

  /// Two manifest entries share a local directory key
  DuplicateLocalKey { key: String },

  /// A configuration value is out of range or empty
  InvalidValue { field: String, reason: String },

  /// The config file could not be parsed
  Malformed { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::PackagesDirMissing { .. } => Some(
        "Run prevalidate from the workspace root, or set `layout.packages_dir` in prevalidate.toml.".to_string(),
      ),
      ConfigError::InvalidManifest { .. } => {
        Some("Every workspace package.json needs a string \"name\" field.".to_string())
      }
      ConfigError::DuplicatePackage { name, .. } => Some(format!(
        "Rename one of the packages so '{}' is unique within the workspace.",
        name
      )),
      ConfigError::Malformed { .. } => Some("Check the file against the documented prevalidate.toml layout.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::PackagesDirMissing { path } => {
        write!(f, "Missing packages directory: {}", path.display())
      }
      ConfigError::InvalidManifest { path, reason } => {
        write!(f, "Invalid package manifest {}: {}", path.display(), reason)
      }
      ConfigError::DuplicatePackage { name, first, second } => {
        write!(
          f,
          "Package name '{}' is declared by both '{}' and '{}'",
          name, first, second
        )
      }
      ConfigError::DuplicateLocalKey { key } => {
        write!(f, "Local directory key '{}' appears more than once", key)
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid value for {}: {}", field, reason)
      }
      ConfigError::Malformed { path, reason } => {
        write!(f, "Failed to parse config {}: {}", path.display(), reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// No common ancestor between the base ref and HEAD
  MergeBaseNotFound { base: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run prevalidate inside a git checkout (looked in {}).",
        path.display()
      )),
      GitError::MergeBaseNotFound { base } => Some(format!(
        "Make sure '{}' exists locally (drop --no-fetch, or pass a different --base).",
        base
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::MergeBaseNotFound { base } => {
        write!(f, "Unable to resolve merge-base for {}", base)
      }
    }
  }
}

/// Validation stage failures
#[derive(Debug)]
pub enum StageError {
  /// Stage command ran and exited non-zero
  Failed { stage: String, command: String, code: i32 },

  /// Stage command could not be started
  SpawnFailed { stage: String, command: String, reason: String },
}

impl StageError {
  fn help_message(&self) -> Option<String> {
    match self {
      StageError::Failed { command, .. } => Some(format!("Re-run `{}` locally to see the full output.", command)),
      StageError::SpawnFailed { .. } => {
        Some("Check that the configured runner is installed and on PATH.".to_string())
      }
    }
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StageError::Failed { stage, command, code } => {
        write!(f, "{} failed (exit code {}): {}", stage, code, command)
      }
      StageError::SpawnFailed { stage, command, reason } => {
        write!(f, "{} could not start `{}`: {}", stage, command, reason)
      }
    }
  }
}

/// Result type alias for prevalidate
pub type ValidateResult<T> = Result<T, ValidateError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ValidateResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ValidateResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ValidateError>,
{
  fn context(self, ctx: impl Into<String>) -> ValidateResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ValidateResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ValidateError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
