// src/graph/sort.rs

//! Linearising the step forest.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::errors::StepGraphError;
use crate::graph::build::{NodeId, StepGraph, StepId};
use crate::graph::link::StepLink;

impl StepGraph {
    /// Order every distinct step so that it comes after all of its producers.
    ///
    /// All structural problems are reported together: one error per
    /// unsatisfied requirement followed by a summary error, and one error per
    /// path that runs into a cycle. Each step appears once in the output,
    /// represented by its first node.
    pub fn topological_sort(&self) -> std::result::Result<Vec<NodeId>, Vec<StepGraphError>> {
        let mut errors = self.missing_dependencies();
        errors.extend(self.cycles());
        if !errors.is_empty() {
            debug!(errors = errors.len(), "step graph is not sortable");
            return Err(errors);
        }

        let first_nodes = self.first_nodes();

        // Edge direction: producer -> consumer.
        let mut graph: DiGraphMap<StepId, ()> = DiGraphMap::new();
        for (step, _) in &first_nodes {
            graph.add_node(*step);
        }
        for (_, node) in self.nodes() {
            for child in &node.children {
                graph.add_edge(node.step, self.node(*child).step, ());
            }
        }

        let by_step: HashMap<StepId, NodeId> = first_nodes.into_iter().collect();
        match toposort(&graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|step| by_step.get(&step).copied())
                .collect()),
            Err(cycle) => Err(vec![StepGraphError::Cycle(vec![
                self.step(cycle.node_id()).name().to_string(),
            ])]),
        }
    }

    fn missing_dependencies(&self) -> Vec<StepGraphError> {
        let created: Vec<StepLink> = self.steps().flat_map(|(_, s)| s.creates()).collect();

        let mut errors = Vec::new();
        for (_, step) in self.steps() {
            for link in step.requires() {
                if created.iter().any(|c| link.matches(c)) {
                    continue;
                }
                let link = match link.unsatisfiable_error() {
                    Some(msg) => msg.to_string(),
                    None => format!("<{link}>"),
                };
                errors.push(StepGraphError::MissingDependency {
                    step: step.name().to_string(),
                    link,
                });
            }
        }

        if !errors.is_empty() {
            errors.push(StepGraphError::MissingDependencies);
        }
        errors
    }

    fn cycles(&self) -> Vec<StepGraphError> {
        let mut walker = CycleWalker {
            graph: self,
            path: Vec::new(),
            visited: HashSet::new(),
            acyclic: HashSet::new(),
            found: Vec::new(),
        };

        for root in self.roots() {
            walker.walk(*root);
        }
        // Cycles with no way in from a root leave their nodes unvisited.
        for (id, _) in self.nodes() {
            if !walker.visited.contains(&id) {
                walker.walk(id);
            }
        }

        walker.found.into_iter().map(StepGraphError::Cycle).collect()
    }

    /// Every step paired with its first node: reachable steps in discovery
    /// order, then whatever else the arena holds.
    fn first_nodes(&self) -> Vec<(StepId, NodeId)> {
        let mut out = self.reachable_steps();
        let mut seen: HashSet<StepId> = out.iter().map(|(s, _)| *s).collect();
        for (id, node) in self.nodes() {
            if seen.insert(node.step) {
                out.push((node.step, id));
            }
        }
        out
    }
}

struct CycleWalker<'a> {
    graph: &'a StepGraph,
    path: Vec<StepId>,
    visited: HashSet<NodeId>,
    /// Nodes whose whole subtree is known to be free of cycles.
    acyclic: HashSet<NodeId>,
    found: Vec<Vec<String>>,
}

impl CycleWalker<'_> {
    /// Returns `true` if a cycle was found below `id`.
    fn walk(&mut self, id: NodeId) -> bool {
        let graph = self.graph;
        let node = graph.node(id);

        if self.path.contains(&node.step) {
            let mut chain: Vec<String> = self
                .path
                .iter()
                .map(|s| graph.step(*s).name().to_string())
                .collect();
            chain.push(graph.step(node.step).name().to_string());
            if !self.found.contains(&chain) {
                self.found.push(chain);
            }
            return true;
        }
        if self.acyclic.contains(&id) {
            return false;
        }

        self.visited.insert(id);
        self.path.push(node.step);
        let mut found = false;
        for child in &node.children {
            found |= self.walk(*child);
        }
        self.path.pop();

        if !found {
            self.acyclic.insert(id);
        }
        found
    }
}
