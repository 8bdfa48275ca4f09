// src/plan.rs

//! From a flat step list to an ordered, annotated, checked plan.

use std::sync::Arc;

use tracing::{debug, info};

use crate::details::StepDetailGraph;
use crate::errors::{Result, StepGraphError};
use crate::graph::{NodeId, Step, StepGraph, build_graph};
use crate::params::DeferredParameters;

/// Knobs for [`plan_steps`].
#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    pub resolve_multi_arch: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            resolve_multi_arch: true,
        }
    }
}

/// A graph that passed every structural and step-level check, together with
/// a safe execution order.
#[derive(Debug)]
pub struct ExecutionPlan {
    graph: StepGraph,
    order: Vec<NodeId>,
}

impl ExecutionPlan {
    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// Nodes in execution order, one per step.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.order.iter().map(|id| self.graph.name_of(*id)).collect()
    }

    /// Ordered steps in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &dyn Step> {
        self.order.iter().map(|id| self.graph.step_of(*id))
    }

    /// Multi-arch steps in execution order, with the children that made
    /// them multi-arch (empty when the step was multi-arch on its own).
    pub fn multi_arch_steps(&self) -> Vec<(&str, Vec<String>)> {
        self.order
            .iter()
            .filter(|id| self.graph.step_of(**id).is_multi_arch())
            .map(|id| {
                let step = self.graph.node(*id).step;
                let mut reasons: Vec<String> = Vec::new();
                for (node_id, node) in self.graph.nodes() {
                    if node.step != step {
                        continue;
                    }
                    for reason in self.graph.multi_arch_reasons(node_id).unwrap_or_default() {
                        if !reasons.contains(reason) {
                            reasons.push(reason.clone());
                        }
                    }
                }
                (self.graph.name_of(*id), reasons)
            })
            .collect()
    }

    pub fn details(&self) -> StepDetailGraph {
        self.graph.step_details()
    }
}

/// Build, validate, order and annotate `steps`.
///
/// Every step's published parameters are registered in `params` first.
/// Validation and structural errors are gathered from all passes and
/// returned as a single aggregated error.
pub fn plan_steps(
    steps: Vec<Box<dyn Step>>,
    params: &Arc<DeferredParameters>,
    options: PlanOptions,
) -> Result<ExecutionPlan> {
    for step in &steps {
        params.add_all(step.provides());
    }

    let mut graph = build_graph(steps);
    info!(
        steps = graph.step_count(),
        roots = graph.roots().len(),
        "planning step graph"
    );

    let mut errors = graph.validate();
    let order = match graph.topological_sort() {
        Ok(order) => order,
        Err(mut sort_errors) => {
            errors.append(&mut sort_errors);
            Vec::new()
        }
    };

    if let Some(err) = StepGraphError::aggregate(errors) {
        return Err(err);
    }

    if options.resolve_multi_arch {
        graph.resolve_multi_arch();
    }

    debug!(order = ?order, "step graph planned");
    Ok(ExecutionPlan { graph, order })
}
