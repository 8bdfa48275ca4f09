// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `stepgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stepgraph",
    version,
    about = "Plan CI pipeline steps from their declared inputs and outputs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline description (TOML).
    ///
    /// Default: `Stepgraph.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STEPGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Also print the step forest.
    #[arg(long)]
    pub tree: bool,

    /// Write planning-time step details as JSON to this path.
    #[arg(long, value_name = "PATH")]
    pub details: Option<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
