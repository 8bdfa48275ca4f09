use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a step, unique within a pipeline.
pub type StepName = String;

/// Identifies a tag on an image stream that lives outside the current
/// pipeline run (e.g. a base image in another namespace).
///
/// `cluster` names the cluster that hosts the stream; `None` is the cluster
/// the pipeline runs on. `as_name` is an optional alias. Both are part of the
/// reference identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageStreamTagReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub namespace: String,
    pub name: String,
    pub tag: String,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,
}

impl ImageStreamTagReference {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            cluster: None,
            namespace: namespace.into(),
            name: name.into(),
            tag: tag.into(),
            as_name: None,
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.as_name = Some(alias.into());
        self
    }
}

impl fmt::Display for ImageStreamTagReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cluster) = &self.cluster {
            write!(f, "{cluster}/")?;
        }
        write!(f, "{}/{}:{}", self.namespace, self.name, self.tag)?;
        if let Some(alias) = &self.as_name {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}
