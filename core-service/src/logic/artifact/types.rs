use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureLayout, TagVocabulary};
use crate::logic::model::{TreeEnsemble, XgbModelDocument};

/// On-disk artifact, exactly as serialized by the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactBlob {
    /// Canonical feature order
    pub feature_names: Vec<String>,
    /// Label encoding for the snippet's root tag
    pub tag_vocabulary: Vec<String>,
    /// Class index (decimal string) → severity score
    pub class_to_score: BTreeMap<String, i32>,
    /// XGBoost JSON model
    pub ensemble: XgbModelDocument,
}

/// Validated artifact, immutable once built
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub layout: FeatureLayout,
    pub vocabulary: TagVocabulary,
    /// Severity score of each class index
    pub class_scores: Vec<i32>,
    pub ensemble: TreeEnsemble,
    /// SHA-256 of the blob bytes (hex)
    pub digest: String,
}

impl ModelArtifact {
    pub fn num_classes(&self) -> usize {
        self.class_scores.len()
    }

    pub fn num_features(&self) -> usize {
        self.layout.len()
    }
}
