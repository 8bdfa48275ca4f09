// src/graph/mod.rs

//! Step dependency graph.
//!
//! - [`link`] defines the values steps produce and consume.
//! - [`step`] is the capability contract the graph works against.
//! - [`build`] stores the forest and builds it from a flat step list.
//! - [`sort`] orders the forest and reports missing dependencies and cycles.
//! - [`multi_arch`] propagates multi-arch requirements to dependents.
//! - [`validate`] runs every step's own validation.

pub mod build;
pub mod link;
pub mod multi_arch;
pub mod sort;
pub mod step;
pub mod validate;

pub use build::{NodeId, StepGraph, StepId, StepNode, build_graph};
pub use link::{StepLink, has_all_links, has_any_link, link_for_image};
pub use step::{ParameterFn, ParameterMap, RunContext, Step, StepFuture};
