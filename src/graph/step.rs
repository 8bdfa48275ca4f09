// src/graph/step.rs

//! The capability contract every unit of work implements.
//!
//! The graph only ever talks to steps through [`Step`]; concrete step kinds
//! (image builds, test runs, release promotion, ...) live with whoever
//! constructs them.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::Result;
use crate::graph::link::StepLink;
use crate::params::DeferredParameters;

/// Lazily evaluated parameter value.
pub type ParameterFn = Arc<dyn Fn() -> Result<String> + Send + Sync>;

/// Parameters a step makes available to the rest of the pipeline.
pub type ParameterMap = BTreeMap<String, ParameterFn>;

/// Boxed future returned by [`Step::run`].
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Everything a running step can reach.
#[derive(Clone)]
pub struct RunContext {
    params: Arc<DeferredParameters>,
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new(params: Arc<DeferredParameters>) -> Self {
        Self {
            params,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn params(&self) -> &DeferredParameters {
        &self.params
    }

    /// Ask running steps to stop. Shared by every clone of this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A unit of work in the pipeline.
///
/// `requires` and `creates` must return the same links for the lifetime of
/// the step. The multi-arch flag is the only state the graph mutates.
pub trait Step: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> String {
        self.name().to_string()
    }

    /// Links that must be produced before this step can run.
    fn requires(&self) -> Vec<StepLink>;

    /// Links this step produces once it has run.
    fn creates(&self) -> Vec<StepLink>;

    /// Self-check of the step's own configuration.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn run<'a>(&'a self, ctx: &'a RunContext) -> StepFuture<'a>;

    fn provides(&self) -> ParameterMap {
        ParameterMap::new()
    }

    /// Runtime objects created by the step, for reporting.
    fn objects(&self) -> Vec<serde_json::Value> {
        Vec::new()
    }

    fn is_multi_arch(&self) -> bool;

    fn set_multi_arch(&mut self, multi_arch: bool);
}
