mod commands;
mod core;
mod exec;
mod graph;
mod scope;
mod ui;
mod utils;
mod workspace;

use clap::{Args, Parser, Subcommand};
use commands::{OutputFormat, ScopeOptions};
use core::error::{ValidateError, print_error};
use graph::Mode;
use std::num::NonZeroUsize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Change-scoped pre-push validation for pnpm workspaces
#[derive(Parser)]
#[command(name = "prevalidate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Verbose output (changed files, spawned commands, debug logs)
  #[arg(long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run lint, typecheck, build and unit tests for the packages affected by this push
  Run {
    #[command(flatten)]
    scope: ScopeArgs,
    /// Print the stage commands instead of running them
    #[arg(long)]
    dry_run: bool,
  },

  /// Show which packages are affected and the stage plan, without running anything
  Affected {
    #[command(flatten)]
    scope: ScopeArgs,
    /// Output format: text (default), json, names
    #[arg(long, default_value = "text")]
    format: OutputFormat,
  },
}

#[derive(Args)]
struct ScopeArgs {
  /// Fast mode: directly changed packages only, no build step
  #[arg(long, overrides_with = "strict")]
  quick: bool,
  /// Strict mode (default): include transitive dependents and the build step
  #[arg(long, overrides_with = "quick")]
  strict: bool,
  /// Base ref to diff against (default: upstream, else `defaults.base` from prevalidate.toml)
  #[arg(long)]
  base: Option<String>,
  /// Validate every package regardless of changes
  #[arg(long)]
  all: bool,
  /// Build before lint/typecheck, matching CI order
  #[arg(long)]
  ci_order: bool,
  /// Largest affected set still tested per package before falling back to global tests
  #[arg(long)]
  max_packages: Option<NonZeroUsize>,
  /// Skip `git fetch` of the base ref
  #[arg(long)]
  no_fetch: bool,
}

impl ScopeArgs {
  fn into_options(self) -> ScopeOptions {
    ScopeOptions {
      mode: if self.quick && !self.strict {
        Mode::Quick
      } else {
        Mode::Strict
      },
      base: self.base,
      all: self.all,
      max_packages: self.max_packages.map(NonZeroUsize::get),
      ci_order: self.ci_order,
      no_fetch: self.no_fetch,
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Diagnostics to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
  let level = if verbose { "debug" } else { "warn" };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("prevalidate={}", level)));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(ValidateError::from(e).context("Failed to get current directory")),
  };

  // Build workspace context once (config, manifests, graph)
  let ctx = match core::context::WorkspaceContext::build(&workspace_root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Run { scope, dry_run } => commands::run_validation(&ctx, &scope.into_options(), dry_run, cli.verbose),
    Commands::Affected { scope, format } => commands::run_affected(&ctx, &scope.into_options(), format),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ValidateError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
