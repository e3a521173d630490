//! Artifact Module - Trained model artifact
//!
//! The artifact is loaded once, validated as a whole and then never mutated.

pub mod storage;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

pub use storage::{load_artifact, parse_artifact, save_artifact, sha256_hex};
pub use types::{ArtifactBlob, ModelArtifact};
pub use validate::ArtifactError;
