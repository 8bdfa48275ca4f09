// src/lib.rs

pub mod cli;
pub mod config;
pub mod details;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod params;
pub mod plan;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate, steps_from_config};
use crate::params::DeferredParameters;
use crate::plan::{ExecutionPlan, PlanOptions, plan_steps};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - steps from config
/// - planning (graph build, validation, ordering, multi-arch)
/// - plan output
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    let plan = plan_config(&cfg)?;
    print_plan(&plan, args.tree);

    if let Some(path) = args.details {
        let json = plan.details().to_json_pretty()?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write step details to {path}"))?;
        info!(path = %path, "wrote step details");
    }

    Ok(())
}

/// Plan every step declared in a validated config.
pub fn plan_config(cfg: &ConfigFile) -> errors::Result<ExecutionPlan> {
    let params = Arc::new(DeferredParameters::new(cfg.parameters.clone()));
    let steps = steps_from_config(cfg)?;
    let options = PlanOptions {
        resolve_multi_arch: cfg.config.resolve_multi_arch,
    };
    plan_steps(steps, &params, options)
}

/// Print the execution order, multi-arch annotations and optionally the forest.
fn print_plan(plan: &ExecutionPlan, tree: bool) {
    println!("stepgraph plan");
    println!();

    println!("order ({}):", plan.order().len());
    for (i, step) in plan.steps().enumerate() {
        println!("  {:>3}. {}", i + 1, step.name());
        let description = step.description();
        if description != step.name() {
            println!("       {description}");
        }
    }

    let multi_arch = plan.multi_arch_steps();
    if !multi_arch.is_empty() {
        println!();
        println!("multi-arch:");
        for (name, reasons) in multi_arch {
            if reasons.is_empty() {
                println!("  - {name}");
            } else {
                println!("  - {name} (because of {})", reasons.join(", "));
            }
        }
    }

    if tree {
        println!();
        println!("graph:");
        for line in plan.graph().render_tree().lines() {
            println!("  {line}");
        }
    }

    debug!("plan printed");
}
