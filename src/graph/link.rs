// src/graph/link.rs

//! Links: the values steps use to declare what they produce and consume.
//!
//! A step never names the steps it depends on. Instead it says "I require the
//! `src` pipeline image" or "I create the RPM repository", and the graph
//! builder wires producers to consumers by matching links.

use std::fmt;

use crate::types::ImageStreamTagReference;

/// Release name used for the release under test.
pub const LATEST_RELEASE_NAME: &str = "latest";
/// Release name used for the release we upgrade from.
pub const INITIAL_RELEASE_NAME: &str = "initial";

/// Image stream holding the intermediate images of a pipeline run.
pub const PIPELINE_IMAGE_STREAM: &str = "pipeline";
/// Image stream holding the component images of the latest release.
pub const STABLE_IMAGE_STREAM: &str = "stable";
/// Image stream holding release payload images.
pub const RELEASE_IMAGE_STREAM: &str = "release";

pub const PIPELINE_TAG_ROOT: &str = "root";
pub const PIPELINE_TAG_BASE: &str = "base";
pub const PIPELINE_TAG_SOURCE: &str = "src";
pub const PIPELINE_TAG_BINARIES: &str = "bin";
pub const PIPELINE_TAG_TEST_BINARIES: &str = "test-bin";
pub const PIPELINE_TAG_RPMS: &str = "rpms";

/// Something a step produces or consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepLink {
    /// An image tag that exists outside the current pipeline run.
    ExternalImage(ImageStreamTagReference),
    /// A tag on the pipeline image stream.
    InternalImage {
        tag: String,
        /// Message shown when nothing in the graph creates this tag.
        unsatisfiable_error: Option<String>,
    },
    /// The RPM repository served from the pipeline's RPMs.
    RpmRepo,
    /// The component images of the named release.
    ReleaseImages(String),
    /// The payload image of the named release.
    ReleasePayloadImage(String),
}

impl StepLink {
    pub fn external_image(reference: ImageStreamTagReference) -> Self {
        StepLink::ExternalImage(reference)
    }

    pub fn internal_image(tag: impl Into<String>) -> Self {
        StepLink::InternalImage {
            tag: tag.into(),
            unsatisfiable_error: None,
        }
    }

    pub fn rpm_repo() -> Self {
        StepLink::RpmRepo
    }

    pub fn release_images(release_name: impl Into<String>) -> Self {
        StepLink::ReleaseImages(release_name.into())
    }

    pub fn release_payload_image(release_name: impl Into<String>) -> Self {
        StepLink::ReleasePayloadImage(release_name.into())
    }

    /// Attach a custom message to an internal image link. Other variants are
    /// returned unchanged.
    pub fn with_unsatisfiable_error(self, message: impl Into<String>) -> Self {
        match self {
            StepLink::InternalImage { tag, .. } => StepLink::InternalImage {
                tag,
                unsatisfiable_error: Some(message.into()),
            },
            other => other,
        }
    }

    /// Whether this link is satisfied by `other`.
    ///
    /// Symmetric; links of different kinds never match.
    pub fn matches(&self, other: &StepLink) -> bool {
        match self {
            StepLink::ExternalImage(reference) => {
                matches!(other, StepLink::ExternalImage(o) if o == reference)
            }
            StepLink::InternalImage { tag, .. } => {
                matches!(other, StepLink::InternalImage { tag: o, .. } if o == tag)
            }
            StepLink::RpmRepo => matches!(other, StepLink::RpmRepo),
            StepLink::ReleaseImages(name) => {
                matches!(other, StepLink::ReleaseImages(o) if o == name)
            }
            StepLink::ReleasePayloadImage(name) => {
                matches!(other, StepLink::ReleasePayloadImage(o) if o == name)
            }
        }
    }

    /// Message to report when nothing creates this link, if one was attached.
    pub fn unsatisfiable_error(&self) -> Option<&str> {
        match self {
            StepLink::InternalImage {
                unsatisfiable_error: Some(msg),
                ..
            } => Some(msg.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for StepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepLink::ExternalImage(reference) => write!(f, "external image {reference}"),
            StepLink::InternalImage { tag, .. } => write!(f, "{PIPELINE_IMAGE_STREAM}:{tag}"),
            StepLink::RpmRepo => write!(f, "rpm repository"),
            StepLink::ReleaseImages(name) => write!(f, "images from release {name}"),
            StepLink::ReleasePayloadImage(name) => write!(f, "payload image of release {name}"),
        }
    }
}

/// Whether any link in `required` is satisfied by any link in `created`.
pub fn has_any_link(required: &[StepLink], created: &[StepLink]) -> bool {
    required
        .iter()
        .any(|r| created.iter().any(|c| r.matches(c)))
}

/// Whether every link in `required` is satisfied by some link in `created`.
pub fn has_all_links(required: &[StepLink], created: &[StepLink]) -> bool {
    required
        .iter()
        .all(|r| created.iter().any(|c| r.matches(c)))
}

/// Image stream that holds the component images of `release_name`.
pub fn release_stream_for(release_name: &str) -> String {
    if release_name == LATEST_RELEASE_NAME {
        return STABLE_IMAGE_STREAM.to_string();
    }
    format!("{STABLE_IMAGE_STREAM}-{release_name}")
}

pub fn is_release_stream(stream: &str) -> bool {
    stream.starts_with(STABLE_IMAGE_STREAM)
}

/// Inverse of [`release_stream_for`].
pub fn release_name_from(stream: &str) -> String {
    if stream == STABLE_IMAGE_STREAM {
        return LATEST_RELEASE_NAME.to_string();
    }
    let prefix = format!("{STABLE_IMAGE_STREAM}-");
    stream.strip_prefix(&prefix).unwrap_or(stream).to_string()
}

/// Link that a reference to `stream:tag` needs, if the stream is one that the
/// pipeline knows how to produce.
pub fn link_for_image(stream: &str, tag: &str) -> Option<StepLink> {
    if stream == PIPELINE_IMAGE_STREAM {
        return Some(StepLink::internal_image(tag));
    }
    if stream == RELEASE_IMAGE_STREAM {
        return Some(StepLink::release_payload_image(tag));
    }
    if is_release_stream(stream) {
        return Some(StepLink::release_images(release_name_from(stream)));
    }
    None
}
