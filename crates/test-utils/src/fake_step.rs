use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stepgraph::errors::{Result, StepGraphError};
use stepgraph::graph::{ParameterFn, ParameterMap, RunContext, Step, StepFuture, StepLink};

/// A step that only declares links.
///
/// - counts how often `validate` and `run` were called
/// - optionally fails validation with a fixed reason
pub struct FakeStep {
    name: String,
    requires: Vec<StepLink>,
    creates: Vec<StepLink>,
    multi_arch: bool,
    validation_error: Option<String>,
    provides: Vec<(String, String)>,
    validations: Arc<AtomicUsize>,
    runs: Arc<AtomicUsize>,
}

impl FakeStep {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            requires: Vec::new(),
            creates: Vec::new(),
            multi_arch: false,
            validation_error: None,
            provides: Vec::new(),
            validations: Arc::new(AtomicUsize::new(0)),
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn requires(mut self, link: StepLink) -> Self {
        self.requires.push(link);
        self
    }

    pub fn creates(mut self, link: StepLink) -> Self {
        self.creates.push(link);
        self
    }

    /// Require the internal image tag `tag`.
    pub fn requires_tag(self, tag: &str) -> Self {
        self.requires(StepLink::internal_image(tag))
    }

    /// Create the internal image tag `tag`.
    pub fn creates_tag(self, tag: &str) -> Self {
        self.creates(StepLink::internal_image(tag))
    }

    pub fn multi_arch(mut self, val: bool) -> Self {
        self.multi_arch = val;
        self
    }

    pub fn failing_validation(mut self, reason: &str) -> Self {
        self.validation_error = Some(reason.to_string());
        self
    }

    pub fn provides(mut self, name: &str, value: &str) -> Self {
        self.provides.push((name.to_string(), value.to_string()));
        self
    }

    /// Shared counter of `validate` calls.
    pub fn validation_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.validations)
    }

    /// Shared counter of `run` calls.
    pub fn run_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.runs)
    }

    pub fn boxed(self) -> Box<dyn Step> {
        Box::new(self)
    }
}

impl Step for FakeStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> Vec<StepLink> {
        self.requires.clone()
    }

    fn creates(&self) -> Vec<StepLink> {
        self.creates.clone()
    }

    fn validate(&self) -> Result<()> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        match &self.validation_error {
            Some(reason) => Err(StepGraphError::InvalidStep {
                step: self.name.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn run<'a>(&'a self, ctx: &'a RunContext) -> StepFuture<'a> {
        let runs = Arc::clone(&self.runs);
        Box::pin(async move {
            if ctx.is_cancelled() {
                return Err(anyhow::anyhow!("step {} cancelled", self.name).into());
            }
            runs.fetch_add(1, Ordering::SeqCst);
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

/// Steps named after the links they create, as used by the ordering tests:
/// step `name` creates `name` and requires each entry of `requires`.
pub fn sort_step(name: &str, requires: &[&str]) -> FakeStep {
    requires
        .iter()
        .fold(FakeStep::new(name).creates_tag(name), |step, r| step.requires_tag(r))
}
