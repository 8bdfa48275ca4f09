// tests/build_graph.rs

use stepgraph::graph::link::{
    PIPELINE_TAG_BINARIES, PIPELINE_TAG_ROOT, PIPELINE_TAG_RPMS, PIPELINE_TAG_SOURCE,
    PIPELINE_TAG_TEST_BINARIES,
};
use stepgraph::graph::{StepGraph, StepLink, build_graph};
use stepgraph::types::ImageStreamTagReference;
use stepgraph_test_utils::fake_step::FakeStep;
use stepgraph_test_utils::init_tracing;

fn base_image(tag: &str) -> StepLink {
    StepLink::external_image(ImageStreamTagReference::new("ns", "base", tag))
}

fn root_names(graph: &StepGraph) -> Vec<&str> {
    graph.roots().iter().map(|id| graph.name_of(*id)).collect()
}

fn children_names<'a>(graph: &'a StepGraph, name: &str) -> Vec<&'a str> {
    let node = graph
        .find_node(name)
        .unwrap_or_else(|| panic!("no node for step {name}"));
    graph
        .children_of(node)
        .iter()
        .map(|id| graph.name_of(*id))
        .collect()
}

#[test]
fn test_empty_input_builds_empty_forest() {
    let graph = build_graph(Vec::new());
    assert!(graph.is_empty());
    assert!(graph.roots().is_empty());
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn test_basic_graph() {
    init_tracing();

    let steps = vec![
        FakeStep::new("root")
            .requires(base_image("latest"))
            .creates_tag(PIPELINE_TAG_ROOT)
            .boxed(),
        FakeStep::new("other")
            .requires(base_image("other"))
            .creates_tag("other")
            .boxed(),
        FakeStep::new("src")
            .requires_tag(PIPELINE_TAG_ROOT)
            .creates_tag(PIPELINE_TAG_SOURCE)
            .boxed(),
        FakeStep::new("bin")
            .requires_tag(PIPELINE_TAG_SOURCE)
            .creates_tag(PIPELINE_TAG_BINARIES)
            .boxed(),
        FakeStep::new("test-bin")
            .requires_tag(PIPELINE_TAG_SOURCE)
            .creates_tag(PIPELINE_TAG_TEST_BINARIES)
            .boxed(),
        FakeStep::new("rpm")
            .requires_tag(PIPELINE_TAG_BINARIES)
            .creates_tag(PIPELINE_TAG_RPMS)
            .boxed(),
        FakeStep::new("unrelated")
            .requires_tag("other")
            .requires_tag(PIPELINE_TAG_RPMS)
            .creates_tag("unrelated")
            .boxed(),
        FakeStep::new("final")
            .requires_tag("unrelated")
            .creates_tag("final")
            .boxed(),
    ];

    let graph = build_graph(steps);

    assert_eq!(root_names(&graph), vec!["root", "other"]);
    assert_eq!(children_names(&graph, "root"), vec!["src"]);
    assert_eq!(children_names(&graph, "src"), vec!["bin", "test-bin"]);
    assert_eq!(children_names(&graph, "bin"), vec!["rpm"]);
    assert_eq!(children_names(&graph, "rpm"), vec!["unrelated"]);
    assert_eq!(children_names(&graph, "other"), vec!["unrelated"]);
    assert_eq!(children_names(&graph, "unrelated"), vec!["final"]);
    assert!(children_names(&graph, "test-bin").is_empty());
    assert!(children_names(&graph, "final").is_empty());

    // `unrelated` sits under two parents but wraps the same step.
    let under_rpm = graph.children_of(graph.find_node("rpm").unwrap())[0];
    let under_other = graph.children_of(graph.find_node("other").unwrap())[0];
    assert_eq!(graph.node(under_rpm).step, graph.node(under_other).step);
}

#[test]
fn test_duplicate_requirements_give_duplicate_children() {
    let steps = vec![
        FakeStep::new("duplicate-root")
            .requires(base_image("latest"))
            .creates_tag(PIPELINE_TAG_ROOT)
            .boxed(),
        FakeStep::new("duplicate-src")
            .requires_tag(PIPELINE_TAG_ROOT)
            .requires_tag(PIPELINE_TAG_ROOT)
            .creates_tag("other")
            .boxed(),
    ];

    let graph = build_graph(steps);

    assert_eq!(root_names(&graph), vec!["duplicate-root"]);
    assert_eq!(
        children_names(&graph, "duplicate-root"),
        vec!["duplicate-src", "duplicate-src"]
    );
}

#[test]
fn test_step_requiring_its_own_output_is_its_own_child() {
    let graph = build_graph(vec![
        FakeStep::new("selfish")
            .requires_tag("loop")
            .creates_tag("loop")
            .boxed(),
    ]);

    assert!(graph.roots().is_empty());
    assert_eq!(children_names(&graph, "selfish"), vec!["selfish"]);
}

#[test]
fn test_step_without_producer_is_root() {
    let graph = build_graph(vec![
        FakeStep::new("consumer").requires_tag("nowhere").boxed(),
        FakeStep::new("rpm-user").requires(StepLink::rpm_repo()).boxed(),
    ]);

    assert_eq!(root_names(&graph), vec!["consumer", "rpm-user"]);
}

#[test]
fn test_render_tree_lists_every_occurrence() {
    let graph = build_graph(vec![
        FakeStep::new("a").creates_tag("a").boxed(),
        FakeStep::new("b").creates_tag("b").boxed(),
        FakeStep::new("c").requires_tag("a").requires_tag("b").boxed(),
    ]);

    let rendered = graph.render_tree();
    assert_eq!(rendered, "a\n  c\nb\n  c\n");
}
