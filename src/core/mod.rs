//! Core building blocks for prevalidate
//!
//! - **config**: prevalidate.toml parsing and validation
//! - **context**: Workspace context (config, manifest snapshot, graph) built once per run
//! - **engine**: Pure classify → select → plan pipeline
//! - **error**: Error types with contextual help messages and exit codes
//! - **plan**: Stage planner and the validation plan it produces
//! - **vcs**: Git queries for change detection (SystemGit)

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod plan;
pub mod vcs;
