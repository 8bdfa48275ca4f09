#![allow(dead_code)]

use std::collections::BTreeMap;
use stepgraph::config::{ConfigFile, ConfigSection, DefaultSection, RawConfigFile, StepConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                default: DefaultSection::default(),
                parameters: BTreeMap::new(),
                step: BTreeMap::new(),
            },
        }
    }

    pub fn with_step(mut self, name: &str, step: StepConfig) -> Self {
        self.config.step.insert(name.to_string(), step);
        self
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.config
            .parameters
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_default_multi_arch(mut self, val: bool) -> Self {
        self.config.default.multi_arch = val;
        self
    }

    pub fn resolve_multi_arch(mut self, val: bool) -> Self {
        self.config.config.resolve_multi_arch = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `StepConfig`.
pub struct StepConfigBuilder {
    step: StepConfig,
}

impl StepConfigBuilder {
    pub fn new() -> Self {
        Self {
            step: StepConfig::default(),
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.step.description = Some(text.to_string());
        self
    }

    pub fn requires(mut self, spec: &str) -> Self {
        self.step.requires.push(spec.to_string());
        self
    }

    pub fn creates(mut self, spec: &str) -> Self {
        self.step.creates.push(spec.to_string());
        self
    }

    pub fn multi_arch(mut self, val: bool) -> Self {
        self.step.multi_arch = Some(val);
        self
    }

    pub fn provides(mut self, name: &str, value: &str) -> Self {
        self.step
            .provides
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> StepConfig {
        self.step
    }
}

impl Default for StepConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
