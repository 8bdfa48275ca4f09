// src/config/validate.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, StepGraphError};
use crate::graph::link::{PIPELINE_TAG_RPMS, StepLink, link_for_image};
use crate::types::ImageStreamTagReference;

static STEP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid step name regex"));

static EXTERNAL_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<cluster>[^/:\s]+)/)?(?P<namespace>[^/:\s]+)/(?P<name>[^/:\s]+):(?P<tag>[^/:\s]+)$")
        .expect("valid external image regex")
});

static STREAM_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<stream>[a-z0-9][a-z0-9.-]*):(?P<tag>[^/:\s]+)$")
        .expect("valid stream tag regex")
});

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = StepGraphError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Check a raw pipeline description; the first problem found is returned.
///
/// Graph-level problems (missing producers, cycles) are not checked here;
/// they are reported, all at once, when the graph is planned.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_steps(cfg)?;
    validate_step_names(cfg)?;
    validate_link_specs(cfg)?;
    Ok(())
}

fn ensure_has_steps(cfg: &RawConfigFile) -> Result<()> {
    if cfg.step.is_empty() {
        return Err(StepGraphError::ConfigError(
            "config must contain at least one [step.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_step_names(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.step.keys() {
        if !STEP_NAME.is_match(name) {
            return Err(StepGraphError::ConfigError(format!(
                "step name '{name}' must start with a letter or digit and contain only letters, digits, '_', '.' or '-'"
            )));
        }
    }
    Ok(())
}

fn validate_link_specs(cfg: &RawConfigFile) -> Result<()> {
    for (name, step) in cfg.step.iter() {
        for spec in step.requires.iter() {
            parse_link_spec(spec).map_err(|e| {
                StepGraphError::ConfigError(format!("step '{name}' has invalid `requires` entry: {e}"))
            })?;
        }
        for spec in step.creates.iter() {
            parse_link_spec(spec).map_err(|e| {
                StepGraphError::ConfigError(format!("step '{name}' has invalid `creates` entry: {e}"))
            })?;
        }
    }
    Ok(())
}

/// Parse a link spec.
///
/// - `rpms` is the RPM repository.
/// - `[<cluster>/]<namespace>/<name>:<tag>` is an external image.
/// - `<stream>:<tag>` is resolved with [`link_for_image`], so `pipeline:src`,
///   `stable:installer`, `stable-initial:cli` and `release:latest` all work.
pub fn parse_link_spec(spec: &str) -> std::result::Result<StepLink, String> {
    let spec = spec.trim();

    if spec == PIPELINE_TAG_RPMS {
        return Ok(StepLink::rpm_repo());
    }

    if let Some(caps) = EXTERNAL_IMAGE.captures(spec) {
        let mut reference =
            ImageStreamTagReference::new(&caps["namespace"], &caps["name"], &caps["tag"]);
        if let Some(cluster) = caps.name("cluster") {
            reference = reference.with_cluster(cluster.as_str());
        }
        return Ok(StepLink::external_image(reference));
    }

    if let Some(caps) = STREAM_TAG.captures(spec) {
        let stream = &caps["stream"];
        return link_for_image(stream, &caps["tag"])
            .ok_or_else(|| format!("'{spec}': unknown image stream '{stream}'"));
    }

    Err(format!(
        "'{spec}': expected `rpms`, `[<cluster>/]<namespace>/<name>:<tag>` or `<stream>:<tag>`"
    ))
}
