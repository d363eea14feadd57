//! Integration tests for `prevalidate run`

use crate::helpers::{chain_workspace, run_prevalidate, run_prevalidate_raw};
use anyhow::Result;

fn dry_run(ws_path: &std::path::Path, extra: &[&str]) -> Result<String> {
  let mut args = vec!["run", "--dry-run", "--no-fetch", "--base", "base"];
  args.extend_from_slice(extra);
  let output = run_prevalidate(ws_path, &args)?;
  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[test]
fn test_run_dry_run_prints_scoped_commands() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/utils/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change utils")?;

  let stdout = dry_run(&ws.path, &[])?;

  assert!(stdout.contains("[dry-run] pnpm lint"), "got: {}", stdout);
  assert!(stdout.contains("[dry-run] pnpm check-types"), "got: {}", stdout);
  assert!(stdout.contains("[dry-run] pnpm build"), "got: {}", stdout);
  assert!(
    stdout.contains("[dry-run] pnpm -r --filter @test/api --filter @test/utils run test:unit"),
    "got: {}",
    stdout
  );
  assert!(stdout.contains("All validation steps passed"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_stage_order() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let normal = dry_run(&ws.path, &[])?;
  let lint = normal.find("pnpm lint").expect("lint printed");
  let build = normal.find("pnpm build").expect("build printed");
  assert!(lint < build, "lint before build by default");

  let ci = dry_run(&ws.path, &["--ci-order"])?;
  let lint = ci.find("pnpm lint").expect("lint printed");
  let build = ci.find("pnpm build").expect("build printed");
  assert!(build < lint, "build before lint with --ci-order");

  Ok(())
}

#[test]
fn test_run_quick_mode_skips_build() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let stdout = dry_run(&ws.path, &["--quick"])?;
  assert!(!stdout.contains("[dry-run] pnpm build"), "got: {}", stdout);
  assert!(stdout.contains("--quick mode"), "got: {}", stdout);
  assert!(stdout.contains("--filter @test/core run test:unit"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_docs_only_runs_lint_alone() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("docs/guide.md", "# Guide\n")?;
  ws.commit("Docs")?;

  let stdout = dry_run(&ws.path, &[])?;
  assert!(stdout.contains("[dry-run] pnpm lint"), "got: {}", stdout);
  assert!(!stdout.contains("check-types"), "got: {}", stdout);
  assert!(!stdout.contains("[dry-run] pnpm build"), "got: {}", stdout);
  assert!(!stdout.contains("test:unit"), "got: {}", stdout);
  assert!(stdout.contains("Lint-only scope"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_nothing_changed_runs_nothing() -> Result<()> {
  let ws = chain_workspace()?;

  let stdout = dry_run(&ws.path, &[])?;
  assert!(!stdout.contains("[dry-run] pnpm"), "got: {}", stdout);
  assert!(stdout.contains("No package-impacting changes detected."), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_global_fallback() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let stdout = dry_run(&ws.path, &["--max-packages", "2"])?;
  assert!(stdout.contains("exceed --max-packages (2)"), "got: {}", stdout);
  assert!(stdout.contains("[dry-run] pnpm test:unit"), "got: {}", stdout);
  assert!(!stdout.contains("--filter"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_executes_configured_runner() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("prevalidate.toml", "[commands]\nrunner = \"true\"\n")?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let output = run_prevalidate(&ws.path, &["run", "--no-fetch", "--base", "base"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("All validation steps passed"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_run_stage_failure_exits_with_validation_code() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("prevalidate.toml", "[commands]\nrunner = \"false\"\n")?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let output = run_prevalidate_raw(&ws.path, &["run", "--no-fetch", "--base", "base"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3), "stdout: {}\nstderr: {}", stdout, stderr);
  assert!(stderr.contains("failed"), "stderr: {}", stderr);
  assert!(stderr.contains("❌ Lint + Typecheck failed"), "stderr: {}", stderr);
  assert!(!stdout.contains("❌"), "stdout: {}", stdout);
  assert!(!stdout.contains("All validation steps passed"));
  // The first group failed, so build never started
  assert!(!stdout.contains("🧭 Build"), "stdout: {}", stdout);

  Ok(())
}

#[test]
fn test_run_unknown_base_is_git_error() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_prevalidate_raw(&ws.path, &["run", "--dry-run", "--no-fetch", "--base", "origin/nope"])?;
  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("merge-base"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_run_invalid_manifest_is_user_error() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/broken/package.json", "{ \"version\": \"1.0.0\" }\n")?;

  let output = run_prevalidate_raw(&ws.path, &["run", "--dry-run", "--no-fetch", "--base", "base"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}
