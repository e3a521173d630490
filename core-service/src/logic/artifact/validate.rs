use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use super::types::{ArtifactBlob, ModelArtifact};
use crate::constants::UNKNOWN_TAG;
use crate::logic::features::{FeatureLayout, TagVocabulary};
use crate::logic::model::{EnsembleError, TreeEnsemble};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Artifact digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Invalid artifact: {0}")]
    Invalid(String),

    #[error("Invalid ensemble: {0}")]
    Ensemble(#[from] EnsembleError),
}

/// Validate a parsed blob and build the immutable artifact.
///
/// Every check runs before anything is returned, so callers either get a
/// complete artifact or nothing.
pub fn validate_blob(blob: ArtifactBlob, digest: String) -> Result<ModelArtifact, ArtifactError> {
    if blob.feature_names.is_empty() {
        return Err(ArtifactError::Invalid("feature_names is empty".into()));
    }

    // Older exports omit learner feature names; when present they define
    // the column order the trees were trained on
    let trained = &blob.ensemble.learner.feature_names;
    if !trained.is_empty() && *trained != blob.feature_names {
        return Err(ArtifactError::Invalid(format!(
            "feature_names disagree with the ensemble's feature names ({} vs {})",
            blob.feature_names.len(),
            trained.len()
        )));
    }

    let layout = FeatureLayout::new(blob.feature_names)
        .map_err(|name| ArtifactError::Invalid(format!("duplicate feature name '{}'", name)))?;

    let vocabulary = TagVocabulary::new(blob.tag_vocabulary)
        .map_err(|tag| ArtifactError::Invalid(format!("duplicate vocabulary tag '{}'", tag)))?;

    let class_scores = parse_class_scores(&blob.class_to_score)?;

    let ensemble = TreeEnsemble::from_document(&blob.ensemble, layout.len(), class_scores.len())?;

    if !vocabulary.has_unknown() {
        log::warn!(
            "Tag vocabulary has no '{}' entry; unseen tags encode as 0",
            UNKNOWN_TAG
        );
    }
    let unextracted = layout.unextracted();
    if !unextracted.is_empty() {
        log::warn!("Model features never extracted (always 0): {:?}", unextracted);
    }

    Ok(ModelArtifact {
        layout,
        vocabulary,
        class_scores,
        ensemble,
        digest,
    })
}

/// Turn the class → score map into a dense vector indexed by class.
///
/// Keys must be exactly 0..K with K >= 2, and scores must be distinct.
pub fn parse_class_scores(map: &BTreeMap<String, i32>) -> Result<Vec<i32>, ArtifactError> {
    let k = map.len();
    if k < 2 {
        return Err(ArtifactError::Invalid(format!(
            "class_to_score needs at least 2 classes, found {}",
            k
        )));
    }

    let mut scores: Vec<Option<i32>> = vec![None; k];
    for (key, &score) in map {
        let index: usize = key
            .trim()
            .parse()
            .map_err(|_| ArtifactError::Invalid(format!("class key '{}' is not an index", key)))?;

        match scores.get_mut(index) {
            Some(slot) if slot.is_none() => *slot = Some(score),
            Some(_) => {
                return Err(ArtifactError::Invalid(format!("class {} mapped twice", index)))
            }
            None => {
                return Err(ArtifactError::Invalid(format!(
                    "class keys are not contiguous: {} with {} classes",
                    index, k
                )))
            }
        }
    }

    // Every slot is filled: k distinct indices, all < k
    let scores: Vec<i32> = scores.into_iter().flatten().collect();

    let mut seen = HashSet::new();
    if let Some(dup) = scores.iter().find(|s| !seen.insert(**s)) {
        return Err(ArtifactError::Invalid(format!(
            "severity score {} assigned to more than one class",
            dup
        )));
    }

    Ok(scores)
}
