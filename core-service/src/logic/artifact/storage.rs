use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::types::{ArtifactBlob, ModelArtifact};
use super::validate::{validate_blob, ArtifactError};

/// Hex SHA-256 of the artifact bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Load, verify and validate an artifact from disk
pub fn load_artifact(path: &Path, expected_sha256: Option<&str>) -> Result<ModelArtifact, ArtifactError> {
    log::info!("Loading model artifact from: {}", path.display());

    let data = fs::read(path)?;
    let artifact = parse_artifact(&data, expected_sha256)?;

    log::info!(
        "Artifact loaded: {} features, {} classes, {} trees (sha256 {})",
        artifact.num_features(),
        artifact.num_classes(),
        artifact.ensemble.num_trees(),
        &artifact.digest[..12]
    );

    Ok(artifact)
}

/// Verify and validate artifact bytes
pub fn parse_artifact(data: &[u8], expected_sha256: Option<&str>) -> Result<ModelArtifact, ArtifactError> {
    let digest = sha256_hex(data);

    if let Some(expected) = expected_sha256 {
        let expected = expected.trim().to_ascii_lowercase();
        if expected != digest {
            return Err(ArtifactError::DigestMismatch {
                expected,
                actual: digest,
            });
        }
    }

    let blob: ArtifactBlob = serde_json::from_slice(data)?;
    validate_blob(blob, digest)
}

/// Save an artifact blob to disk
pub fn save_artifact(blob: &ArtifactBlob, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(blob)?;
    fs::write(path, json)?;
    Ok(())
}
