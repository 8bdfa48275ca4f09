// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Pipeline description as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// resolve_multi_arch = true
///
/// [default]
/// multi_arch = false
///
/// [parameters]
/// JOB_NAME = "pull-ci-unit"
///
/// [step.src]
/// requires = ["pipeline:root"]
/// creates = ["pipeline:src"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub default: DefaultSection,

    /// Externally supplied parameter values.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    /// All steps from `[step.<name>]`, keyed by step name.
    #[serde(default)]
    pub step: BTreeMap<String, StepConfig>,
}

/// Validated pipeline description.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so holders can rely on
/// every step name and link spec being well formed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub default: DefaultSection,
    pub parameters: BTreeMap<String, String>,
    pub step: BTreeMap<String, StepConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            default: raw.default,
            parameters: raw.parameters,
            step: raw.step,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Propagate multi-arch requirements to dependents while planning.
    #[serde(default = "default_resolve_multi_arch")]
    pub resolve_multi_arch: bool,
}

fn default_resolve_multi_arch() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            resolve_multi_arch: default_resolve_multi_arch(),
        }
    }
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Multi-arch flag for steps that do not set their own.
    #[serde(default)]
    pub multi_arch: bool,
}

/// `[step.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StepConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// Link specs this step consumes, e.g. `"pipeline:src"`, `"rpms"`,
    /// `"ocp/base:4.16"`.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Link specs this step produces.
    #[serde(default)]
    pub creates: Vec<String>,

    /// If `None`, falls back to `default.multi_arch`.
    #[serde(default)]
    pub multi_arch: Option<bool>,

    /// Parameters this step publishes once planned.
    #[serde(default)]
    pub provides: BTreeMap<String, String>,
}

impl StepConfig {
    pub fn effective_multi_arch(&self, default: &DefaultSection) -> bool {
        self.multi_arch.unwrap_or(default.multi_arch)
    }
}
