// src/config/mod.rs

//! Pipeline description loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a description from disk (`loader.rs`).
//! - Validate step names and link specs (`validate.rs`).
//! - Produce steps from a validated description (`steps.rs`).

pub mod loader;
pub mod model;
pub mod steps;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, DefaultSection, RawConfigFile, StepConfig};
pub use steps::{ConfiguredStep, steps_from_config};
pub use validate::{parse_link_spec, validate_config};
