// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a pipeline description and return the raw [`RawConfigFile`].
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for a
/// checked [`ConfigFile`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    debug!(path = %path.display(), steps = config.step.len(), "loaded pipeline config");

    Ok(config)
}

/// Load a pipeline description from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks step names and link specs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `Stepgraph.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Stepgraph.toml")
}
