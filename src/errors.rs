// src/errors.rs

//! Crate-wide error type and aggregation helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StepGraphError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A required link is not created by any step in the graph.
    #[error("step {step} is missing dependencies: {link}")]
    MissingDependency { step: String, link: String },

    /// Summary entry that follows every batch of `MissingDependency` errors.
    #[error("steps are missing dependencies")]
    MissingDependencies,

    /// Ordered chain of step names that closes on its last element.
    #[error("cycle in graph: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("step {step} is invalid: {reason}")]
    InvalidStep { step: String, reason: String },

    #[error("could not lazily evaluate deferred parameter {name:?}: {reason}")]
    Parameter { name: String, reason: String },

    #[error("{}", render_report(.0))]
    Multiple(Vec<StepGraphError>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StepGraphError {
    /// Collapse a list of errors into a single one.
    ///
    /// Returns `None` for an empty list and the error itself for a list of one.
    pub fn aggregate(mut errors: Vec<StepGraphError>) -> Option<StepGraphError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(StepGraphError::Multiple(errors)),
        }
    }

    /// Flattened list of the individual problems carried by this error.
    pub fn problems(&self) -> Vec<String> {
        match self {
            StepGraphError::Multiple(errors) => {
                let mut out: Vec<String> = Vec::new();
                for err in errors {
                    for msg in err.problems() {
                        if !out.contains(&msg) {
                            out.push(msg);
                        }
                    }
                }
                out
            }
            other => vec![other.to_string()],
        }
    }
}

/// One bullet per distinct problem, in first-seen order.
fn render_report(errors: &[StepGraphError]) -> String {
    let mut seen: Vec<String> = Vec::new();
    for err in errors {
        for msg in err.problems() {
            if !seen.contains(&msg) {
                seen.push(msg);
            }
        }
    }

    let mut out = format!("found {} problems:", seen.len());
    for msg in seen {
        out.push_str("\n  * ");
        out.push_str(&msg);
    }
    out
}

pub type Result<T> = std::result::Result<T, StepGraphError>;
