// src/graph/build.rs

//! Step graph storage and construction.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use tracing::debug;

use crate::graph::step::Step;

/// Index of a step inside a [`StepGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepId(usize);

impl StepId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a node (one occurrence of a step) inside a [`StepGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One occurrence of a step in the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNode {
    pub step: StepId,
    /// Nodes whose requirements this node's step satisfies.
    pub children: Vec<NodeId>,
    /// Children that made this node multi-arch, set by
    /// [`StepGraph::resolve_multi_arch`].
    pub multi_arch_reasons: Option<Vec<String>>,
}

/// Forest of steps, stored as an arena.
///
/// Steps are owned once and referenced by [`StepId`]; nodes reference steps,
/// so several nodes may wrap the same step. Roots are the nodes whose step has
/// no producer inside the graph.
#[derive(Default)]
pub struct StepGraph {
    steps: Vec<Box<dyn Step>>,
    nodes: Vec<StepNode>,
    roots: Vec<NodeId>,
}

impl StepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: Box<dyn Step>) -> StepId {
        self.steps.push(step);
        StepId(self.steps.len() - 1)
    }

    /// Add a node wrapping `step`, with no children.
    pub fn add_node(&mut self, step: StepId) -> NodeId {
        self.nodes.push(StepNode {
            step,
            children: Vec::new(),
            multi_arch_reasons: None,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to the children of `parent`. Duplicates are kept.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    pub fn add_root(&mut self, node: NodeId) {
        self.roots.push(node);
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &StepNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut StepNode {
        &mut self.nodes[id.0]
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn step(&self, id: StepId) -> &dyn Step {
        self.steps[id.0].as_ref()
    }

    pub(crate) fn step_mut(&mut self, id: StepId) -> &mut dyn Step {
        self.steps[id.0].as_mut()
    }

    /// The step wrapped by `node`.
    pub fn step_of(&self, node: NodeId) -> &dyn Step {
        self.step(self.nodes[node.0].step)
    }

    pub fn name_of(&self, node: NodeId) -> &str {
        self.step_of(node).name()
    }

    pub fn steps(&self) -> impl Iterator<Item = (StepId, &dyn Step)> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, s)| (StepId(i), s.as_ref()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &StepNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Look a node up by the name of the step it wraps (first match).
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|(id, _)| self.name_of(*id) == name).map(|(id, _)| id)
    }

    /// Distinct steps reachable from the roots, in depth-first pre-order.
    ///
    /// Each step is reported once, paired with the first node found for it.
    pub fn reachable_steps(&self) -> Vec<(StepId, NodeId)> {
        let mut seen_steps: HashSet<StepId> = HashSet::new();
        let mut seen_nodes: HashSet<NodeId> = HashSet::new();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if !seen_nodes.insert(id) {
                continue;
            }
            let node = self.node(id);
            if seen_steps.insert(node.step) {
                out.push((node.step, id));
            }
            stack.extend(node.children.iter().rev().copied());
        }

        out
    }

    /// Names of the steps with a node that lists `step`'s node as a child,
    /// sorted and deduplicated.
    pub fn producers_of(&self, step: StepId) -> Vec<String> {
        let names: BTreeSet<String> = self
            .nodes
            .iter()
            .filter(|parent| {
                parent
                    .children
                    .iter()
                    .any(|child| self.node(*child).step == step)
            })
            .map(|parent| self.step(parent.step).name().to_string())
            .collect();
        names.into_iter().collect()
    }

    /// Indented rendering of the forest, one line per node occurrence.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        for root in &self.roots {
            self.render_node(*root, 0, &mut path, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, path: &mut Vec<NodeId>, out: &mut String) {
        let node = self.node(id);
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.name_of(id));
        if self.step(node.step).is_multi_arch() {
            out.push_str(" [multi-arch]");
        }
        if path.contains(&id) {
            out.push_str(" (cycle)\n");
            return;
        }
        out.push('\n');

        path.push(id);
        for child in &node.children {
            self.render_node(*child, depth + 1, path, out);
        }
        path.pop();
    }
}

impl fmt::Debug for StepGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<&str> = self.steps.iter().map(|s| s.name()).collect();
        f.debug_struct("StepGraph")
            .field("steps", &steps)
            .field("nodes", &self.nodes)
            .field("roots", &self.roots)
            .finish()
    }
}

/// Build the step forest.
///
/// Every step gets one node. `node` becomes a child of `other` once for every
/// pair of (required link of `node`, created link of `other`) that match, so a
/// step requiring the same link twice appears twice under its producer. A step
/// whose own links match is its own child; the cycle is reported by
/// [`StepGraph::topological_sort`].
pub fn build_graph(steps: Vec<Box<dyn Step>>) -> StepGraph {
    let mut graph = StepGraph::new();

    let ids: Vec<NodeId> = steps
        .into_iter()
        .map(|step| {
            let step_id = graph.add_step(step);
            graph.add_node(step_id)
        })
        .collect();

    let requires: Vec<_> = ids.iter().map(|id| graph.step_of(*id).requires()).collect();
    let creates: Vec<_> = ids.iter().map(|id| graph.step_of(*id).creates()).collect();

    for (i, node) in ids.iter().enumerate() {
        let mut is_root = true;

        for (j, other) in ids.iter().enumerate() {
            for required in &requires[i] {
                for created in &creates[j] {
                    if required.matches(created) {
                        is_root = false;
                        graph.add_child(*other, *node);
                    }
                }
            }
        }

        if is_root {
            graph.add_root(*node);
        }
    }

    debug!(
        steps = graph.step_count(),
        roots = graph.roots().len(),
        "built step graph"
    );

    graph
}
