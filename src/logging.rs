// src/logging.rs

//! Logging for the `stepgraph` binary.
//!
//! `--log-level` wins. Otherwise `STEPGRAPH_LOG` is read as an `EnvFilter`
//! directive list, so `STEPGRAPH_LOG=stepgraph::graph=debug` narrows output
//! to the graph passes. An unset or unparsable variable falls back to `info`.
//! Everything goes to stderr; stdout carries the plan.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "STEPGRAPH_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env_value.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Filter for the given CLI flag and `STEPGRAPH_LOG` value.
pub(crate) fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level_directive(level));
    }

    env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
