// src/graph/multi_arch.rs

//! Multi-arch propagation.
//!
//! A step that consumes the output of a multi-arch step has to be multi-arch
//! itself, transitively up to the roots. The flag lives on the step; the list
//! of children that caused it lives on each node occurrence.

use std::collections::HashMap;

use tracing::debug;

use crate::graph::build::{NodeId, StepGraph};

impl StepGraph {
    /// Mark every node with a multi-arch child as multi-arch.
    ///
    /// Children are resolved before their parents. A marked node records the
    /// names of the responsible children, in child order. Nodes without
    /// multi-arch children are left untouched. Running this twice gives the
    /// same result as running it once.
    pub fn resolve_multi_arch(&mut self) {
        let mut resolved: HashMap<NodeId, bool> = HashMap::new();
        let mut path: Vec<NodeId> = Vec::new();

        let roots = self.roots().to_vec();
        for root in roots {
            self.resolve_node(root, &mut resolved, &mut path);
        }
    }

    /// Children that made `node` multi-arch, if any.
    pub fn multi_arch_reasons(&self, node: NodeId) -> Option<&[String]> {
        self.node(node).multi_arch_reasons.as_deref()
    }

    fn resolve_node(
        &mut self,
        id: NodeId,
        resolved: &mut HashMap<NodeId, bool>,
        path: &mut Vec<NodeId>,
    ) -> bool {
        if let Some(multi_arch) = resolved.get(&id) {
            return *multi_arch;
        }
        if path.contains(&id) {
            return self.step_of(id).is_multi_arch();
        }

        path.push(id);
        let children = self.children_of(id).to_vec();
        let mut reasons: Vec<String> = Vec::new();
        let mut counted: Vec<NodeId> = Vec::new();
        for child in children {
            let child_multi_arch = self.resolve_node(child, resolved, path);
            if child_multi_arch && !counted.contains(&child) {
                counted.push(child);
                reasons.push(self.name_of(child).to_string());
            }
        }
        path.pop();

        if !reasons.is_empty() {
            debug!(
                step = %self.name_of(id),
                reasons = ?reasons,
                "step is multi-arch because of its dependents"
            );
            let step = self.node(id).step;
            self.step_mut(step).set_multi_arch(true);
            self.node_mut(id).multi_arch_reasons = Some(reasons);
        }

        let multi_arch = self.step_of(id).is_multi_arch();
        resolved.insert(id, multi_arch);
        multi_arch
    }
}
