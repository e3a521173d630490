//! Loaded Model - everything one request needs, built as a unit

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::ServiceError;
use super::types::ViolationInput;
use crate::logic::artifact::{load_artifact, ModelArtifact};
use crate::logic::explain::{self, AttributionEngine, AttributionResult, TreeShapExplainer};
use crate::logic::features::{FeatureLayout, FeatureVector, HtmlFeatureExtractor, TagVocabulary};
use crate::logic::model::{Classifier, InferenceEngine, PredictionResult};

/// Where a model came from
#[derive(Debug, Clone, Default)]
pub struct ModelSource {
    pub path: Option<PathBuf>,
    pub digest: Option<String>,
    pub tree_count: usize,
}

/// Immutable model bundle: vocabulary, inference engine, attribution engine
pub struct LoadedModel {
    vocabulary: TagVocabulary,
    inference: InferenceEngine,
    explainer: Arc<dyn AttributionEngine>,
    source: ModelSource,
    loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    /// Assemble from already-built engines
    pub fn new(
        vocabulary: TagVocabulary,
        inference: InferenceEngine,
        explainer: Arc<dyn AttributionEngine>,
        source: ModelSource,
    ) -> Self {
        Self {
            vocabulary,
            inference,
            explainer,
            source,
            loaded_at: Utc::now(),
        }
    }

    /// Build the ensemble-backed engines for a validated artifact
    pub fn from_artifact(artifact: ModelArtifact, path: Option<PathBuf>) -> Result<Self, ServiceError> {
        let ModelArtifact {
            layout,
            vocabulary,
            class_scores,
            ensemble,
            digest,
        } = artifact;

        let source = ModelSource {
            path,
            digest: Some(digest),
            tree_count: ensemble.num_trees(),
        };

        let ensemble = Arc::new(ensemble);
        let explainer = Arc::new(TreeShapExplainer::new(ensemble.clone(), layout.clone()));
        let classifier: Arc<dyn Classifier> = ensemble;
        let inference = InferenceEngine::new(classifier, layout, class_scores)?;

        Ok(Self::new(vocabulary, inference, explainer, source))
    }

    /// Read, verify and build a model from an artifact file
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Result<Self, ServiceError> {
        let artifact = load_artifact(path, expected_sha256)?;
        Self::from_artifact(artifact, Some(path.to_path_buf()))
    }

    pub fn layout(&self) -> &FeatureLayout {
        self.inference.layout()
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    pub fn num_classes(&self) -> usize {
        self.inference.num_classes()
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Feature vector for a violation, in this model's layout
    pub fn extract(&self, input: &ViolationInput) -> FeatureVector {
        HtmlFeatureExtractor::new(self.layout(), &self.vocabulary).extract(
            &input.affected_html_elements,
            &input.supplementary_information,
            &input.violation_name,
        )
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, ServiceError> {
        Ok(self.inference.predict(vector)?)
    }

    pub fn explain(&self, vector: &FeatureVector, class: usize) -> Result<AttributionResult, ServiceError> {
        Ok(explain::explain(
            self.explainer.as_ref(),
            vector,
            self.layout(),
            class,
            self.num_classes(),
        )?)
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("inference", &self.inference)
            .field("source", &self.source)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}
