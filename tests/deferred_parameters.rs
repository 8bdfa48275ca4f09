// tests/deferred_parameters.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Barrier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use stepgraph::errors::{Result, StepGraphError};
use stepgraph::graph::ParameterFn;
use stepgraph::params::DeferredParameters;

fn constant(value: &str) -> ParameterFn {
    let value = value.to_string();
    Arc::new(move || Ok(value.clone()))
}

fn counting(value: &str, calls: &Arc<AtomicUsize>) -> ParameterFn {
    let value = value.to_string();
    let calls = Arc::clone(calls);
    Arc::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value.clone())
    })
}

fn failing(reason: &'static str) -> ParameterFn {
    Arc::new(move || -> Result<String> { Err(anyhow::anyhow!(reason).into()) })
}

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_unknown_parameter_is_none() {
    let params = DeferredParameters::default();
    assert_eq!(params.get("NOPE").unwrap(), None);
    assert!(!params.has("NOPE"));
}

#[test]
fn test_function_is_evaluated_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let params = DeferredParameters::default();
    params.add("IMAGE", counting("registry/image:tag", &calls));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(params.get("IMAGE").unwrap().as_deref(), Some("registry/image:tag"));
    assert_eq!(params.get("IMAGE").unwrap().as_deref(), Some("registry/image:tag"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_environment_wins_over_functions() {
    let calls = Arc::new(AtomicUsize::new(0));
    let params = DeferredParameters::new(env(&[("IMAGE", "from-env")]));
    params.add("IMAGE", counting("from-graph", &calls));

    assert!(params.has_input("IMAGE"));
    assert_eq!(params.get("IMAGE").unwrap().as_deref(), Some("from-env"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_later_add_replaces_unevaluated_function() {
    let params = DeferredParameters::default();
    params.add("NAME", constant("first"));
    params.add("NAME", constant("second"));

    assert_eq!(params.get("NAME").unwrap().as_deref(), Some("second"));
}

#[test]
fn test_add_after_evaluation_is_ignored() {
    let params = DeferredParameters::default();
    params.add("NAME", constant("first"));
    assert_eq!(params.get("NAME").unwrap().as_deref(), Some("first"));

    params.add("NAME", constant("second"));
    assert_eq!(params.get("NAME").unwrap().as_deref(), Some("first"));
}

#[test]
fn test_set_does_not_override() {
    let params = DeferredParameters::default();
    params.set("LITERAL", "one");
    params.set("LITERAL", "two");
    assert_eq!(params.get("LITERAL").unwrap().as_deref(), Some("one"));

    params.add("LAZY", constant("lazy"));
    params.set("LAZY", "literal");
    assert_eq!(params.get("LAZY").unwrap().as_deref(), Some("lazy"));
}

#[test]
fn test_has_reports_every_source() {
    let params = DeferredParameters::new(env(&[("FROM_ENV", "1")]));
    params.add("FROM_FN", constant("2"));
    params.set("FROM_SET", "3");

    assert!(params.has("FROM_ENV"));
    assert!(params.has("FROM_FN"));
    assert!(params.has("FROM_SET"));
    assert!(!params.has_input("FROM_FN"));
    assert!(!params.has_input("FROM_SET"));
}

#[test]
fn test_failing_function_reports_parameter_name() {
    let params = DeferredParameters::default();
    params.add("BROKEN", failing("registry unreachable"));

    let err = params.get("BROKEN").unwrap_err();
    assert!(matches!(err, StepGraphError::Parameter { ref name, .. } if name == "BROKEN"));
    assert_eq!(
        err.to_string(),
        "could not lazily evaluate deferred parameter \"BROKEN\": registry unreachable"
    );
}

#[test]
fn test_function_may_read_other_parameters() {
    let params = Arc::new(DeferredParameters::default());
    params.set("REGISTRY", "registry.example.com");

    let inner = Arc::clone(&params);
    params.add(
        "IMAGE",
        Arc::new(move || -> Result<String> {
            let registry = inner.get("REGISTRY")?.unwrap_or_default();
            Ok(format!("{registry}/pipeline:bin"))
        }),
    );

    assert_eq!(
        params.get("IMAGE").unwrap().as_deref(),
        Some("registry.example.com/pipeline:bin")
    );
}

#[test]
fn test_map_resolves_everything() {
    let params = DeferredParameters::new(env(&[("A", "env")]));
    params.add("B", constant("fn"));
    params.set("C", "set");

    let map = params.map().unwrap();
    assert_eq!(map, env(&[("A", "env"), ("B", "fn"), ("C", "set")]));
}

#[test]
fn test_map_collects_every_failure() {
    let params = DeferredParameters::default();
    params.add("OK", constant("fine"));
    params.add("BAD1", failing("one"));
    params.add("BAD2", failing("two"));

    let err = params.map().unwrap_err();
    assert_eq!(err.problems().len(), 2);
    assert!(err.to_string().starts_with("found 2 problems:"));
}

#[test]
fn test_concurrent_first_readers_share_one_evaluation() {
    const READERS: usize = 8;

    let params = Arc::new(DeferredParameters::default());
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&counter);
    params.add(
        "TOKEN",
        Arc::new(move || -> Result<String> {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(100));
            Ok(format!("token-{n}"))
        }),
    );

    let barrier = Arc::new(Barrier::new(READERS));
    let handles: Vec<_> = (0..READERS)
        .map(|_| {
            let params = Arc::clone(&params);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                params.get("TOKEN").unwrap().unwrap()
            })
        })
        .collect();
    let seen: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(seen.iter().all(|v| v == "token-0"), "readers disagreed: {seen:?}");
    assert_eq!(params.get("TOKEN").unwrap().as_deref(), Some("token-0"));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_evaluation_is_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let params = DeferredParameters::default();
    params.add(
        "FLAKY",
        Arc::new(move || -> Result<String> {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("lookup failed").into())
        }),
    );

    assert!(params.get("FLAKY").is_err());
    let err = params.get("FLAKY").unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not lazily evaluate deferred parameter \"FLAKY\": lookup failed"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
