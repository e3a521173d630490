//! Sample artifact shared by unit tests
//!
//! 24 extractor features, 4 classes (scores 2-5), five small trees keyed on
//! alt text, images, contrast, buttons/aria-label and snippet length.

use super::storage::parse_artifact;
use super::types::{ArtifactBlob, ModelArtifact};

pub const SAMPLE_ARTIFACT_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../fixtures/sample_artifacts.json"
));

pub fn sample_blob() -> ArtifactBlob {
    serde_json::from_str(SAMPLE_ARTIFACT_JSON).unwrap()
}

pub fn sample_artifact() -> ModelArtifact {
    parse_artifact(SAMPLE_ARTIFACT_JSON.as_bytes(), None).unwrap()
}
