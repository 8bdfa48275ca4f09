// src/details.rs

//! Execution metadata for steps, accumulated for reporting.
//!
//! The execution engine records what it knows about each step as it goes
//! (timings, created objects, log locations). Records for the same step that
//! arrive from different sources are merged.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::StepGraph;
use crate::types::StepName;

/// What is known about a single step (or substep) run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDetailInfo {
    #[serde(rename = "name")]
    pub step_name: StepName,

    #[serde(default)]
    pub description: String,

    /// Names of the steps this one depends on.
    #[serde(default)]
    pub dependencies: Vec<StepName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,

    /// Runtime objects the step created.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
}

/// A step record plus the records of its substeps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDetails {
    #[serde(flatten)]
    pub info: StepDetailInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substeps: Vec<StepDetailInfo>,
}

impl StepDetails {
    pub fn name(&self) -> &str {
        &self.info.step_name
    }

    /// Fill every empty field of `self` from `from`.
    fn merge(&mut self, from: StepDetails) {
        let into = &mut self.info;
        let info = from.info;

        if into.description.is_empty() {
            into.description = info.description;
        }
        if into.dependencies.is_empty() {
            into.dependencies = info.dependencies;
        }
        if into.started_at.is_none() {
            into.started_at = info.started_at;
        }
        if into.finished_at.is_none() {
            into.finished_at = info.finished_at;
        }
        if into.duration.is_none() {
            into.duration = info.duration;
        }
        if into.manifests.is_empty() {
            into.manifests = info.manifests;
        }
        if into.log_url.is_none() {
            into.log_url = info.log_url;
        }
        if into.failed.is_none() {
            into.failed = info.failed;
        }
        if self.substeps.is_empty() {
            self.substeps = from.substeps;
        }
    }
}

/// Ordered collection of step records, at most one per step name once merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepDetailGraph(pub Vec<StepDetails>);

impl StepDetailGraph {
    /// Merge `from` into the collection.
    ///
    /// A record whose name is already present fills in the empty fields of the
    /// existing record; any other record is appended.
    pub fn merge_from(&mut self, from: impl IntoIterator<Item = StepDetails>) {
        for step in from {
            match self.0.iter_mut().find(|existing| existing.name() == step.name()) {
                Some(existing) => existing.merge(step),
                None => self.0.push(step),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&StepDetails> {
        self.0.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_pretty(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl StepGraph {
    /// Planning-time records for every step reachable from the roots.
    pub fn step_details(&self) -> StepDetailGraph {
        let details = self
            .reachable_steps()
            .into_iter()
            .map(|(step_id, _)| {
                let step = self.step(step_id);
                StepDetails {
                    info: StepDetailInfo {
                        step_name: step.name().to_string(),
                        description: step.description(),
                        dependencies: self.producers_of(step_id),
                        manifests: step.objects(),
                        ..StepDetailInfo::default()
                    },
                    substeps: Vec::new(),
                }
            })
            .collect();
        StepDetailGraph(details)
    }
}
