// src/config/steps.rs

//! Turning a validated [`ConfigFile`] into steps.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::model::{ConfigFile, DefaultSection, StepConfig};
use crate::config::validate::parse_link_spec;
use crate::errors::{Result, StepGraphError};
use crate::graph::link::StepLink;
use crate::graph::step::{ParameterFn, ParameterMap, RunContext, Step, StepFuture};

/// A step declared in the pipeline description.
///
/// It carries only the declaration: links, description, published
/// parameters. Running it does no work; the execution engine that consumes
/// the plan decides what a declared step does.
#[derive(Debug, Clone)]
pub struct ConfiguredStep {
    name: String,
    description: Option<String>,
    requires: Vec<StepLink>,
    creates: Vec<StepLink>,
    provides: Vec<(String, String)>,
    multi_arch: bool,
}

impl ConfiguredStep {
    pub fn from_config(name: &str, cfg: &StepConfig, default: &DefaultSection) -> Result<Self> {
        let parse = |spec: &String| {
            parse_link_spec(spec).map_err(|e| {
                StepGraphError::ConfigError(format!("step '{name}': {e}"))
            })
        };

        Ok(Self {
            name: name.to_string(),
            description: cfg.description.clone(),
            requires: cfg.requires.iter().map(parse).collect::<Result<_>>()?,
            creates: cfg.creates.iter().map(parse).collect::<Result<_>>()?,
            provides: cfg
                .provides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            multi_arch: cfg.effective_multi_arch(default),
        })
    }
}

impl Step for ConfiguredStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.name.clone())
    }

    fn requires(&self) -> Vec<StepLink> {
        self.requires.clone()
    }

    fn creates(&self) -> Vec<StepLink> {
        self.creates.clone()
    }

    /// A step may not consume a link it produces itself.
    fn validate(&self) -> Result<()> {
        let own: Vec<String> = self
            .requires
            .iter()
            .filter(|r| self.creates.iter().any(|c| r.matches(c)))
            .map(|r| r.to_string())
            .collect();

        if own.is_empty() {
            return Ok(());
        }
        Err(StepGraphError::InvalidStep {
            step: self.name.clone(),
            reason: format!("requires links it creates itself: {}", own.join(", ")),
        })
    }

    fn run<'a>(&'a self, ctx: &'a RunContext) -> StepFuture<'a> {
        Box::pin(async move {
            if ctx.is_cancelled() {
                debug!(step = %self.name, "run cancelled before start");
                return Ok(());
            }
            info!(step = %self.name, "declared step has nothing to execute");
            Ok(())
        })
    }

    fn provides(&self) -> ParameterMap {
        self.provides
            .iter()
            .map(|(name, value)| {
                let value = value.clone();
                let f: ParameterFn = Arc::new(move || Ok(value.clone()));
                (name.clone(), f)
            })
            .collect()
    }

    fn is_multi_arch(&self) -> bool {
        self.multi_arch
    }

    fn set_multi_arch(&mut self, multi_arch: bool) {
        self.multi_arch = multi_arch;
    }
}

/// One [`ConfiguredStep`] per `[step.<name>]`, in name order.
pub fn steps_from_config(cfg: &ConfigFile) -> Result<Vec<Box<dyn Step>>> {
    cfg.step
        .iter()
        .map(|(name, step)| {
            let step = ConfiguredStep::from_config(name, step, &cfg.default)?;
            Ok(Box::new(step) as Box<dyn Step>)
        })
        .collect()
}
