// tests/links.rs

use stepgraph::graph::link::{
    INITIAL_RELEASE_NAME, LATEST_RELEASE_NAME, PIPELINE_TAG_RPMS, PIPELINE_TAG_SOURCE, StepLink,
    has_all_links, has_any_link, is_release_stream, link_for_image, release_name_from,
    release_stream_for,
};
use stepgraph::types::ImageStreamTagReference;

fn external(tag: &str) -> StepLink {
    StepLink::external_image(ImageStreamTagReference::new("ns", "name", tag))
}

#[test]
fn test_links_match_themselves() {
    let cases = vec![
        ("internal", StepLink::internal_image(PIPELINE_TAG_RPMS)),
        ("external", external("latest")),
        ("rpm", StepLink::rpm_repo()),
        ("release images", StepLink::release_images(LATEST_RELEASE_NAME)),
        ("release payload", StepLink::release_payload_image(LATEST_RELEASE_NAME)),
    ];

    for (name, link) in cases {
        assert!(link.matches(&link.clone()), "{name} should match itself");
    }
}

#[test]
fn test_links_with_different_values_do_not_match() {
    assert!(!StepLink::internal_image(PIPELINE_TAG_RPMS)
        .matches(&StepLink::internal_image(PIPELINE_TAG_SOURCE)));
    assert!(!external("latest").matches(&external("other")));
    assert!(!StepLink::release_images(LATEST_RELEASE_NAME)
        .matches(&StepLink::release_images(INITIAL_RELEASE_NAME)));
    assert!(!StepLink::release_payload_image(LATEST_RELEASE_NAME)
        .matches(&StepLink::release_payload_image(INITIAL_RELEASE_NAME)));
}

#[test]
fn test_links_of_different_kinds_never_match() {
    let links = vec![
        StepLink::internal_image(LATEST_RELEASE_NAME),
        external(LATEST_RELEASE_NAME),
        StepLink::rpm_repo(),
        StepLink::release_images(LATEST_RELEASE_NAME),
        StepLink::release_payload_image(LATEST_RELEASE_NAME),
    ];

    for (i, first) in links.iter().enumerate() {
        for (j, second) in links.iter().enumerate() {
            if i == j {
                continue;
            }
            assert!(
                !first.matches(second),
                "expected {first:?} not to match {second:?}"
            );
            assert_eq!(first.matches(second), second.matches(first));
        }
    }
}

#[test]
fn test_external_alias_is_part_of_identity() {
    let plain = StepLink::external_image(ImageStreamTagReference::new("ns", "base", "latest"));
    let aliased = StepLink::external_image(
        ImageStreamTagReference::new("ns", "base", "latest").with_alias("base-alias"),
    );
    assert!(!plain.matches(&aliased));
    assert!(!aliased.matches(&plain));
    assert!(aliased.matches(&aliased.clone()));
}

#[test]
fn test_external_cluster_is_part_of_identity() {
    let local = ImageStreamTagReference::new("ocp", "base", "4.16");
    let remote = ImageStreamTagReference::new("ocp", "base", "4.16").with_cluster("app.ci");

    assert!(!StepLink::external_image(local.clone()).matches(&StepLink::external_image(remote.clone())));
    assert!(StepLink::external_image(remote.clone()).matches(&StepLink::external_image(remote.clone())));
    assert_eq!(local.to_string(), "ocp/base:4.16");
    assert_eq!(remote.to_string(), "app.ci/ocp/base:4.16");
    assert_eq!(
        remote.with_alias("base").to_string(),
        "app.ci/ocp/base:4.16 as base"
    );
}

#[test]
fn test_unsatisfiable_error_does_not_affect_matching() {
    let plain = StepLink::internal_image("bin");
    let annotated = StepLink::internal_image("bin").with_unsatisfiable_error("build bin first");

    assert!(plain.matches(&annotated));
    assert!(annotated.matches(&plain));
    assert_eq!(annotated.unsatisfiable_error(), Some("build bin first"));
    assert_eq!(plain.unsatisfiable_error(), None);
}

#[test]
fn test_has_any_and_all_links() {
    let created = vec![StepLink::internal_image("src"), StepLink::rpm_repo()];

    assert!(has_any_link(
        &[StepLink::internal_image("bin"), StepLink::rpm_repo()],
        &created
    ));
    assert!(!has_all_links(
        &[StepLink::internal_image("bin"), StepLink::rpm_repo()],
        &created
    ));
    assert!(has_all_links(
        &[StepLink::internal_image("src"), StepLink::rpm_repo()],
        &created
    ));
    assert!(has_all_links(&[], &created));
    assert!(!has_any_link(&[], &created));
}

#[test]
fn test_release_names_round_trip_through_streams() {
    for name in [LATEST_RELEASE_NAME, INITIAL_RELEASE_NAME, "foo", "-x"] {
        let stream = release_stream_for(name);
        assert!(
            is_release_stream(&stream),
            "stream {stream} for name {name} was not identified as a release stream"
        );
        assert_eq!(release_name_from(&stream), name);
    }
    assert_eq!(release_stream_for(LATEST_RELEASE_NAME), "stable");
    assert_eq!(release_stream_for(INITIAL_RELEASE_NAME), "stable-initial");
}

#[test]
fn test_release_name_strips_only_the_stream_prefix() {
    assert_eq!(release_name_from("stable"), "latest");
    assert_eq!(release_name_from("stable-4.16"), "4.16");
    assert_eq!(release_name_from("stable--x"), "-x");
    assert_eq!(release_name_from("stable---x"), "--x");
}

#[test]
fn test_link_for_image() {
    let cases = vec![
        ("pipeline", "src", Some(StepLink::internal_image(PIPELINE_TAG_SOURCE))),
        ("pipeline", "rpms", Some(StepLink::internal_image(PIPELINE_TAG_RPMS))),
        ("stable", "installer", Some(StepLink::release_images(LATEST_RELEASE_NAME))),
        ("stable-initial", "cli", Some(StepLink::release_images(INITIAL_RELEASE_NAME))),
        (
            "stable-whatever",
            "hyperconverged-cluster-operator",
            Some(StepLink::release_images("whatever")),
        ),
        ("release", "latest", Some(StepLink::release_payload_image(LATEST_RELEASE_NAME))),
        ("crazy", "tag", None),
    ];

    for (stream, tag, expected) in cases {
        assert_eq!(
            link_for_image(stream, tag),
            expected,
            "got incorrect link for {stream}:{tag}"
        );
    }
}
