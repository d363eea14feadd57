//! Stage command invocations and the runners that execute them

use crate::core::config::CommandsConfig;
use crate::core::error::{StageError, ValidateResult};
use crate::core::plan::{Stage, StageDecision};
use crate::ui::{Tone, paint};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// One external command for one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub stage: Stage,
  pub program: String,
  pub args: Vec<String>,
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

impl Invocation {
  /// Map a stage decision onto its command; `None` for skipped stages.
  ///
  /// Scoped test runs become `<runner> -r <filter> <pkg>... run <script>`.
  pub fn for_decision(
    stage: Stage,
    decision: &StageDecision,
    commands: &CommandsConfig,
    test_script: &str,
  ) -> Option<Self> {
    let args = match decision {
      StageDecision::Skip { .. } => return None,
      StageDecision::Run | StageDecision::GlobalFallback { .. } => match stage {
        Stage::Lint => commands.lint.clone(),
        Stage::Typecheck => commands.typecheck.clone(),
        Stage::Build => commands.build.clone(),
        Stage::Test => commands.test.clone(),
      },
      StageDecision::RunScoped { packages } => {
        let mut args = vec!["-r".to_string()];
        for package in packages {
          args.push(commands.filter_flag.clone());
          args.push(package.clone());
        }
        args.push("run".to_string());
        args.push(test_script.to_string());
        args
      }
    };

    Some(Self {
      stage,
      program: commands.runner.clone(),
      args,
    })
  }
}

/// Executes stage invocations
///
/// Shared across the threads of a parallel group, hence `Sync`.
pub trait CommandRunner: Sync {
  fn run(&self, invocation: &Invocation) -> ValidateResult<()>;
}

/// Spawns real processes with inherited stdio
pub struct SystemRunner {
  cwd: PathBuf,
  verbose: bool,
}

impl SystemRunner {
  pub fn new(cwd: impl Into<PathBuf>, verbose: bool) -> Self {
    Self {
      cwd: cwd.into(),
      verbose,
    }
  }
}

impl CommandRunner for SystemRunner {
  fn run(&self, invocation: &Invocation) -> ValidateResult<()> {
    if self.verbose {
      println!("ℹ️  {}", paint(Tone::Muted, &invocation.to_string()));
    }

    tracing::debug!(stage = %invocation.stage, command = %invocation, "spawning stage command");
    let status = Command::new(&invocation.program)
      .args(&invocation.args)
      .current_dir(&self.cwd)
      .status()
      .map_err(|e| StageError::SpawnFailed {
        stage: invocation.stage.to_string(),
        command: invocation.to_string(),
        reason: e.to_string(),
      })?;

    if !status.success() {
      return Err(
        StageError::Failed {
          stage: invocation.stage.to_string(),
          command: invocation.to_string(),
          code: status.code().unwrap_or(-1),
        }
        .into(),
      );
    }
    Ok(())
  }
}

/// Prints what would run and succeeds
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
  fn run(&self, invocation: &Invocation) -> ValidateResult<()> {
    println!("⏭️  {} {}", paint(Tone::Muted, "[dry-run]"), invocation);
    Ok(())
  }
}
