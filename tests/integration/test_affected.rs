//! Integration tests for `prevalidate affected`

use crate::helpers::{NodeWorkspace, affected_json, affected_names, chain_workspace, run_prevalidate};
use anyhow::Result;

#[test]
fn test_affected_source_change_pulls_in_dependents() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let names = affected_names(&ws.path, &[])?;
  assert_eq!(names, vec!["@test/api", "@test/core", "@test/utils"]);

  Ok(())
}

#[test]
fn test_affected_quick_mode_is_direct_only() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let names = affected_names(&ws.path, &["--quick"])?;
  assert_eq!(names, vec!["@test/core"]);

  // --strict after --quick wins
  let names = affected_names(&ws.path, &["--quick", "--strict"])?;
  assert_eq!(names.len(), 3);

  Ok(())
}

#[test]
fn test_affected_test_only_change_does_not_propagate() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/core/test/index.test.ts", "// more tests\n")?;
  ws.commit("Touch core tests")?;

  let names = affected_names(&ws.path, &[])?;
  assert_eq!(names, vec!["@test/core"]);

  Ok(())
}

#[test]
fn test_affected_no_changes() -> Result<()> {
  let ws = chain_workspace()?;

  let output = run_prevalidate(&ws.path, &["affected", "--no-fetch", "--base", "base"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Changed files: 0"), "got: {}", stdout);
  assert!(stdout.contains("Affected: 0 packages"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_affected_json_output() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/utils/src/index.ts", "export const name = \"changed\";\n")?;
  ws.write_file("docs/guide.md", "# Guide\n")?;
  ws.commit("Change utils and docs")?;

  let json = affected_json(&ws.path, &[])?;

  assert_eq!(json["base"], "base");
  assert_eq!(json["mode"], "strict");
  assert_eq!(json["lint_only"], false);
  assert_eq!(json["affected"]["packages"], serde_json::json!(["@test/api", "@test/utils"]));
  assert_eq!(json["affected"]["dependents"], serde_json::json!(["@test/api"]));
  assert_eq!(json["scope"]["source_changed"], serde_json::json!(["utils"]));
  assert_eq!(json["summary"]["changed_files_count"], 2);
  assert_eq!(json["summary"]["affected_count"], 2);
  assert_eq!(json["plan"]["id"].as_str().map(str::len), Some(64));

  let test_stage = json["plan"]["groups"]
    .as_array()
    .and_then(|groups| groups.iter().find(|g| g["name"] == "Unit tests"))
    .map(|g| g["stages"][0]["decision"].clone())
    .expect("test stage present");
  assert_eq!(test_stage["action"], "run_scoped");
  assert_eq!(test_stage["packages"], serde_json::json!(["@test/api", "@test/utils"]));

  Ok(())
}

#[test]
fn test_affected_docs_only_is_lint_only() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("docs/guide.md", "# Guide\n")?;
  ws.write_file("scripts/release.mjs", "console.log(1);\n")?;
  ws.commit("Docs and scripts")?;

  let json = affected_json(&ws.path, &[])?;
  assert_eq!(json["lint_only"], true);
  assert_eq!(json["summary"]["affected_count"], 0);

  let stages: Vec<(String, String)> = json["plan"]["groups"]
    .as_array()
    .into_iter()
    .flatten()
    .flat_map(|g| g["stages"].as_array().cloned().unwrap_or_default())
    .map(|s| {
      (
        s["stage"].as_str().unwrap_or_default().to_string(),
        s["decision"]["action"].as_str().unwrap_or_default().to_string(),
      )
    })
    .collect();
  assert!(stages.contains(&("lint".to_string(), "run".to_string())));
  assert!(stages.contains(&("build".to_string(), "skip".to_string())));
  assert!(stages.contains(&("test".to_string(), "skip".to_string())));

  Ok(())
}

#[test]
fn test_affected_root_config_forces_all() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("pnpm-lock.yaml", "lockfileVersion: '9.0'\n")?;
  ws.commit("Update lockfile")?;

  let json = affected_json(&ws.path, &["--quick"])?;
  assert_eq!(json["scope"]["force_all"], true);
  assert_eq!(json["affected"]["selection"], "forced_by_root_config");
  assert_eq!(json["summary"]["affected_count"], 4);

  Ok(())
}

#[test]
fn test_affected_threshold_fallback() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/core/src/index.ts", "export const name = \"changed\";\n")?;
  ws.commit("Change core")?;

  let json = affected_json(&ws.path, &["--max-packages", "2"])?;
  let decision = json["plan"]["groups"]
    .as_array()
    .and_then(|groups| groups.iter().find(|g| g["name"] == "Unit tests"))
    .map(|g| g["stages"][0]["decision"].clone())
    .expect("test stage present");
  assert_eq!(decision["action"], "global_fallback");
  assert_eq!(decision["affected"], 3);
  assert_eq!(decision["max_packages"], 2);

  Ok(())
}

#[test]
fn test_affected_missing_test_script_warns() -> Result<()> {
  let ws = chain_workspace()?;
  ws.write_file("packages/site/src/index.ts", "export const page = 1;\n")?;
  ws.commit("Change site")?;

  let json = affected_json(&ws.path, &[])?;
  assert_eq!(
    json["plan"]["warnings"],
    serde_json::json!([{ "kind": "missing_test_script", "package": "@test/site", "script": "test:unit" }])
  );

  Ok(())
}

#[test]
fn test_affected_all_skips_diff() -> Result<()> {
  let ws = chain_workspace()?;

  // No base branch needed with --all
  let output = run_prevalidate(&ws.path, &["affected", "--all", "--format", "names"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert_eq!(stdout.lines().count(), 4);

  Ok(())
}

#[test]
fn test_affected_uses_configured_base() -> Result<()> {
  let ws = NodeWorkspace::new()?;
  ws.add_package("core", "@test/core", &[], &["test:unit"])?;
  ws.write_file("prevalidate.toml", "[defaults]\nbase = \"base\"\n")?;
  ws.commit("Add core and config")?;
  ws.mark_base()?;
  ws.write_file("packages/core/src/index.ts", "export const name = 2;\n")?;
  ws.commit("Change core")?;

  let output = run_prevalidate(&ws.path, &["affected", "--no-fetch", "--format", "names"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "@test/core");

  Ok(())
}

#[test]
fn test_affected_rejects_zero_max_packages() -> Result<()> {
  let ws = chain_workspace()?;

  let output = crate::helpers::run_prevalidate_raw(&ws.path, &["affected", "--max-packages", "0"])?;
  assert!(!output.status.success());

  Ok(())
}
