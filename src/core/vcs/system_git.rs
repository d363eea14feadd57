//! System git backend
//!
//! Shells out to the `git` binary for the handful of read-mostly queries change
//! detection needs:
//! - Upstream detection (`rev-parse @{upstream}`)
//! - Refreshing the base ref (`fetch --quiet`)
//! - Merge-base lookup and NUL-delimited diff listing
//!
//! Every command runs through [`SystemGit::git_cmd`] with an isolated environment.

use crate::core::error::{GitError, ResultExt, ValidateError, ValidateResult};
use crate::utils::split_nul_paths;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Git backend using the system git binary
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ValidateResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ValidateError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ValidateError::with_help(
        format!("Failed to open git repository: {}", stderr.trim()),
        "Run prevalidate from inside the workspace's git checkout.",
      ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(stdout.trim()),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Upstream of the current branch (e.g. "origin/feature"), if one is configured
  pub fn upstream_ref(&self) -> ValidateResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"])
      .output()
      .context("Failed to query upstream branch")?;

    if !output.status.success() {
      return Ok(None);
    }

    let upstream = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!upstream.is_empty()).then_some(upstream))
  }

  /// Refresh the base ref from its remote.
  ///
  /// `origin/main` fetches `origin`; a bare branch name fetches the default remote.
  pub fn fetch_base(&self, base: &str) -> ValidateResult<()> {
    let mut cmd = self.git_cmd();
    cmd.args(["fetch", "--quiet"]);
    if let Some(remote) = remote_of(base) {
      cmd.arg(remote);
    }

    debug!(base, "fetching base ref");
    let output = cmd.output().context("Failed to fetch")?;
    check(&output, "git fetch --quiet")?;
    Ok(())
  }

  /// Common ancestor of `base` and HEAD
  pub fn merge_base(&self, base: &str) -> ValidateResult<String> {
    let output = self
      .git_cmd()
      .args(["merge-base", base, "HEAD"])
      .output()
      .context("Failed to run git merge-base")?;

    if !output.status.success() {
      return Err(ValidateError::Git(GitError::MergeBaseNotFound { base: base.to_string() }));
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() {
      return Err(ValidateError::Git(GitError::MergeBaseNotFound { base: base.to_string() }));
    }
    debug!(base, merge_base = %sha, "resolved merge-base");
    Ok(sha)
  }

  /// Paths added, copied, modified, renamed or deleted between the merge-base with
  /// `base` and HEAD, relative to the repository root
  pub fn changed_files_since(&self, base: &str) -> ValidateResult<Vec<String>> {
    let merge_base = self.merge_base(base)?;
    let range = format!("{}..HEAD", merge_base);

    let output = self
      .git_cmd()
      .args(["diff", "--name-only", "-z", "--diff-filter=ACMRD", &range])
      .output()
      .context("Failed to run git diff")?;
    let stdout = check(&output, &format!("git diff --name-only {}", range))?;

    let paths = split_nul_paths(&stdout);
    debug!(count = paths.len(), %range, "collected changed paths");
    Ok(paths)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists PATH, HOME and the SSH agent variables fetch needs
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    for var in ["PATH", "HOME", "SSH_AUTH_SOCK", "GIT_SSH_COMMAND"] {
      if let Ok(value) = std::env::var(var) {
        cmd.env(var, value);
      }
    }

    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

/// Remote component of a remote-tracking ref ("origin/main" → "origin")
fn remote_of(base: &str) -> Option<&str> {
  base.split_once('/').map(|(remote, _)| remote).filter(|remote| !remote.is_empty())
}

fn check(output: &Output, command: &str) -> ValidateResult<String> {
  if !output.status.success() {
    return Err(ValidateError::Git(GitError::CommandFailed {
      command: command.to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }));
  }
  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
