//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A pnpm-style workspace (`packages/<dir>/package.json`) with git history
pub struct NodeWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl NodeWorkspace {
  /// Create a new workspace with root manifests and an initial commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;

    std::fs::write(
      path.join("package.json"),
      r#"{
  "name": "test-monorepo",
  "private": true,
  "scripts": { "lint": "biome check", "build": "pnpm -r build" }
}
"#,
    )?;
    std::fs::write(path.join("pnpm-workspace.yaml"), "packages:\n  - \"packages/*\"\n")?;
    std::fs::create_dir_all(path.join("packages"))?;
    std::fs::create_dir_all(path.join("docs"))?;
    std::fs::write(path.join("docs/README.md"), "# Docs\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial workspace setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a package under `packages/<dir>` with workspace deps and scripts
  pub fn add_package(&self, dir: &str, name: &str, deps: &[&str], scripts: &[&str]) -> Result<PathBuf> {
    let pkg_path = self.path.join("packages").join(dir);
    std::fs::create_dir_all(pkg_path.join("src"))?;
    std::fs::create_dir_all(pkg_path.join("test"))?;

    let dependencies: Vec<String> = deps.iter().map(|d| format!("    \"{}\": \"workspace:^\"", d)).collect();
    let scripts: Vec<String> = scripts.iter().map(|s| format!("    \"{}\": \"vitest run\"", s)).collect();
    let manifest = format!(
      "{{\n  \"name\": \"{}\",\n  \"version\": \"0.1.0\",\n  \"dependencies\": {{\n{}\n  }},\n  \"scripts\": {{\n{}\n  }}\n}}\n",
      name,
      dependencies.join(",\n"),
      scripts.join(",\n")
    );
    std::fs::write(pkg_path.join("package.json"), manifest)?;
    std::fs::write(pkg_path.join("src/index.ts"), format!("export const name = \"{}\";\n", name))?;
    std::fs::write(pkg_path.join("test/index.test.ts"), "import {name} from \"../src/index.js\";\n")?;

    Ok(pkg_path)
  }

  /// Write (or overwrite) a file relative to the workspace root
  pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
    let path = self.path.join(rel);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "-A"])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Mark the current commit as the comparison base (branch `base`)
  pub fn mark_base(&self) -> Result<()> {
    git(&self.path, &["branch", "base"])?;
    Ok(())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the prevalidate binary without checking its exit status
pub fn run_prevalidate_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_prevalidate");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env("NO_COLOR", "1")
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run prevalidate")
}

/// Run the prevalidate binary, failing on a non-zero exit
pub fn run_prevalidate(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_prevalidate_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "prevalidate command failed: prevalidate {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Affected package names from `affected --format names`
pub fn affected_names(cwd: &Path, extra: &[&str]) -> Result<Vec<String>> {
  let mut args = vec!["affected", "--format", "names", "--no-fetch", "--base", "base"];
  args.extend_from_slice(extra);
  let output = run_prevalidate(cwd, &args)?;
  Ok(
    String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(String::from)
      .collect(),
  )
}

/// Parsed JSON from `affected --format json`
pub fn affected_json(cwd: &Path, extra: &[&str]) -> Result<serde_json::Value> {
  let mut args = vec!["affected", "--format", "json", "--no-fetch", "--base", "base"];
  args.extend_from_slice(extra);
  let output = run_prevalidate(cwd, &args)?;
  serde_json::from_slice(&output.stdout).context("affected --format json produced invalid JSON")
}

/// The standard fixture: core ← utils ← api, plus a standalone `site` without tests
pub fn chain_workspace() -> Result<NodeWorkspace> {
  let ws = NodeWorkspace::new()?;
  ws.add_package("core", "@test/core", &[], &["test:unit", "build"])?;
  ws.add_package("utils", "@test/utils", &["@test/core"], &["test:unit", "build"])?;
  ws.add_package("api", "@test/api", &["@test/utils"], &["test:unit", "build"])?;
  ws.add_package("site", "@test/site", &[], &["build"])?;
  ws.commit("Add packages")?;
  ws.mark_base()?;
  Ok(ws)
}
