//! Plan execution
//!
//! Groups run strictly in plan order. Runnable stages inside one group are dispatched
//! together on the rayon pool and jointly awaited; the first failing group stops the run.

pub mod runner;

use crate::core::config::CommandsConfig;
use crate::core::error::ValidateResult;
use crate::core::plan::{PlanWarning, Stage, StageDecision, StageGroup, ValidationPlan};
use crate::ui::output;
use rayon::prelude::*;

pub use runner::{CommandRunner, DryRunRunner, Invocation, SystemRunner};

/// Execute every group of `plan`, returning the invocations that ran.
pub fn execute_plan(
  plan: &ValidationPlan,
  commands: &CommandsConfig,
  test_script: &str,
  runner: &dyn CommandRunner,
) -> ValidateResult<Vec<Invocation>> {
  let mut executed = Vec::new();

  for group in &plan.groups {
    let ran = output::step(&group.name, || run_group(group, plan, commands, test_script, runner))?;
    executed.extend(ran);
  }

  Ok(executed)
}

fn run_group(
  group: &StageGroup,
  plan: &ValidationPlan,
  commands: &CommandsConfig,
  test_script: &str,
  runner: &dyn CommandRunner,
) -> ValidateResult<Vec<Invocation>> {
  let mut invocations = Vec::new();

  for stage_plan in &group.stages {
    match &stage_plan.decision {
      StageDecision::Skip { reason } => output::skipped(&stage_plan.stage.to_string(), &reason.to_string()),
      StageDecision::GlobalFallback { affected, max_packages } => output::warn(&format!(
        "Affected packages ({}) exceed --max-packages ({}); running global tests.",
        affected, max_packages
      )),
      _ => {}
    }

    if stage_plan.stage == Stage::Test {
      for warning in &plan.warnings {
        match warning {
          PlanWarning::MissingTestScript { .. } => output::warn(&warning.to_string()),
        }
      }
    }

    if let Some(invocation) = Invocation::for_decision(stage_plan.stage, &stage_plan.decision, commands, test_script) {
      invocations.push(invocation);
    }
  }

  match invocations.len() {
    0 => {}
    1 => runner.run(&invocations[0])?,
    _ => {
      let results: Vec<ValidateResult<()>> = invocations.par_iter().map(|inv| runner.run(inv)).collect();
      for result in results {
        result?;
      }
    }
  }

  Ok(invocations)
}
