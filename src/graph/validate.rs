// src/graph/validate.rs

use tracing::debug;

use crate::errors::StepGraphError;
use crate::graph::build::StepGraph;

impl StepGraph {
    /// Run every reachable step's own validation once and collect all errors.
    ///
    /// A step that occurs under several parents is validated once.
    pub fn validate(&self) -> Vec<StepGraphError> {
        let mut errors = Vec::new();

        for (step_id, _) in self.reachable_steps() {
            let step = self.step(step_id);
            if let Err(err) = step.validate() {
                debug!(step = %step.name(), error = %err, "step failed validation");
                errors.push(err);
            }
        }

        errors
    }
}
