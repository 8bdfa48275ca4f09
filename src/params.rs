// src/params.rs

//! Deferred parameters shared between steps.
//!
//! Steps publish values (e.g. the pull spec of an image they build) as lazy
//! functions; consumers read them once the producer has run. Values supplied
//! from the environment take precedence over anything the graph provides.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, warn};

use crate::errors::{Result, StepGraphError};
use crate::graph::step::{ParameterFn, ParameterMap};

/// A registered function and the outcome of its single evaluation.
struct LazySlot {
    f: ParameterFn,
    outcome: OnceLock<std::result::Result<String, String>>,
}

impl LazySlot {
    fn new(f: ParameterFn) -> Self {
        Self {
            f,
            outcome: OnceLock::new(),
        }
    }

    fn is_evaluated(&self) -> bool {
        self.outcome.get().is_some()
    }
}

#[derive(Default)]
struct ParamsInner {
    fns: BTreeMap<String, Arc<LazySlot>>,
    values: BTreeMap<String, String>,
}

/// Thread-safe, lazily evaluated key/value store.
///
/// Each registered function runs at most once. Concurrent first readers of
/// the same key wait for that single evaluation and share its outcome.
#[derive(Default)]
pub struct DeferredParameters {
    inner: Mutex<ParamsInner>,
    env: BTreeMap<String, String>,
}

impl DeferredParameters {
    /// Create a store whose externally supplied inputs are `env`.
    pub fn new(env: BTreeMap<String, String>) -> Self {
        Self {
            inner: Mutex::new(ParamsInner::default()),
            env,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ParamsInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a lazy function for `name`.
    ///
    /// Replaces a previously registered function that has not been evaluated
    /// yet. Has no effect once `name` has a value.
    pub fn add(&self, name: impl Into<String>, f: ParameterFn) {
        let name = name.into();
        let mut inner = self.lock();

        let evaluated = inner.fns.get(&name).is_some_and(|slot| slot.is_evaluated());
        if evaluated || inner.values.contains_key(&name) {
            debug!(param = %name, "parameter already resolved; ignoring new function");
            return;
        }
        if inner.fns.contains_key(&name) {
            warn!(param = %name, "overriding previously registered parameter function");
        }
        inner.fns.insert(name, Arc::new(LazySlot::new(f)));
    }

    pub fn add_all(&self, map: ParameterMap) {
        for (name, f) in map {
            self.add(name, f);
        }
    }

    /// Store a literal value unless `name` already has a value or a function.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let mut inner = self.lock();

        if inner.fns.contains_key(&name) || inner.values.contains_key(&name) {
            debug!(param = %name, "parameter already provided; ignoring set");
            return;
        }
        inner.values.insert(name, value.into());
    }

    /// Whether anything (environment, value or function) provides `name`.
    pub fn has(&self, name: &str) -> bool {
        if self.env.contains_key(name) {
            return true;
        }
        let inner = self.lock();
        inner.fns.contains_key(name) || inner.values.contains_key(name)
    }

    /// Whether `name` was supplied externally rather than by the graph.
    pub fn has_input(&self, name: &str) -> bool {
        self.env.contains_key(name)
    }

    /// Resolve `name`.
    ///
    /// Order: stored value, environment, registered function. The function
    /// runs without the store lock held, so it may read other parameters. It
    /// must not read `name` itself. A failed evaluation is not retried.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let slot = {
            let mut inner = self.lock();
            if let Some(value) = inner.values.get(name) {
                return Ok(Some(value.clone()));
            }
            if let Some(value) = self.env.get(name) {
                inner.values.insert(name.to_string(), value.clone());
                return Ok(Some(value.clone()));
            }
            match inner.fns.get(name) {
                Some(slot) => Arc::clone(slot),
                None => return Ok(None),
            }
        };

        let outcome = slot.outcome.get_or_init(|| {
            debug!(param = %name, "evaluating deferred parameter");
            (slot.f)().map_err(|err| err.to_string())
        });

        match outcome {
            Ok(value) => Ok(Some(value.clone())),
            Err(reason) => Err(StepGraphError::Parameter {
                name: name.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    /// Resolve every known parameter.
    ///
    /// Evaluation errors are collected rather than stopping at the first one.
    pub fn map(&self) -> Result<BTreeMap<String, String>> {
        let names: Vec<String> = {
            let inner = self.lock();
            let mut names: Vec<String> = inner
                .fns
                .keys()
                .chain(inner.values.keys())
                .chain(self.env.keys())
                .cloned()
                .collect();
            names.sort();
            names.dedup();
            names
        };

        let mut out = BTreeMap::new();
        let mut errors = Vec::new();
        for name in names {
            match self.get(&name) {
                Ok(Some(value)) => {
                    out.insert(name, value);
                }
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }

        match StepGraphError::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(out),
        }
    }
}
