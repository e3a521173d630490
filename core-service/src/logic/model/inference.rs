//! Inference Engine - feature vector → severity class
//!
//! The classifier sits behind a trait so the engine doesn't care how the
//! margins are produced. The engine owns the layout check and the
//! class-index → severity-score mapping.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ensemble::{argmax, softmax, TreeEnsemble};
use crate::constants::PROBABILITY_TOLERANCE;
use crate::logic::features::{FeatureLayout, FeatureVector, LayoutMismatchError};

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Multiclass model producing one raw margin per class
pub trait Classifier: Send + Sync {
    fn num_classes(&self) -> usize;

    fn num_features(&self) -> usize;

    fn margins(&self, x: &[f32]) -> Vec<f64>;

    fn predict_proba(&self, x: &[f32]) -> Vec<f64> {
        softmax(&self.margins(x))
    }
}

impl Classifier for TreeEnsemble {
    fn num_classes(&self) -> usize {
        TreeEnsemble::num_classes(self)
    }

    fn num_features(&self) -> usize {
        TreeEnsemble::num_features(self)
    }

    fn margins(&self, x: &[f32]) -> Vec<f64> {
        TreeEnsemble::margins(self, x)
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_class_index: usize,
    /// External severity score of the predicted class
    pub severity_score: i32,
    /// Probability of the predicted class
    pub probability: f64,
    /// Severity score → probability
    pub all_class_probabilities: BTreeMap<i32, f64>,
    /// Raw per-class margins, in class-index order
    pub margins: Vec<f64>,
    pub inference_time_us: u64,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("classifier has {classifier} classes but {mapped} are mapped to scores")]
    ClassCount { classifier: usize, mapped: usize },

    #[error("classifier expects {classifier} features but layout has {layout}")]
    FeatureCount { classifier: usize, layout: usize },

    #[error("class probabilities sum to {0}")]
    Normalization(f64),
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct InferenceEngine {
    classifier: Arc<dyn Classifier>,
    layout: FeatureLayout,
    /// Severity score of each class index
    class_scores: Vec<i32>,
}

impl InferenceEngine {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        layout: FeatureLayout,
        class_scores: Vec<i32>,
    ) -> Result<Self, InferenceError> {
        if classifier.num_classes() != class_scores.len() {
            return Err(InferenceError::ClassCount {
                classifier: classifier.num_classes(),
                mapped: class_scores.len(),
            });
        }
        if classifier.num_features() != layout.len() {
            return Err(InferenceError::FeatureCount {
                classifier: classifier.num_features(),
                layout: layout.len(),
            });
        }

        Ok(Self {
            classifier,
            layout,
            class_scores,
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn class_scores(&self) -> &[i32] {
        &self.class_scores
    }

    pub fn num_classes(&self) -> usize {
        self.class_scores.len()
    }

    /// Run the classifier on a vector built for this engine's layout
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, InferenceError> {
        let start_time = Instant::now();

        vector.validate(&self.layout)?;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Feature vector: {}", vector.to_log_entry(&self.layout));
        }

        let margins = self.classifier.margins(vector.as_slice());
        if margins.len() != self.class_scores.len() {
            return Err(InferenceError::ClassCount {
                classifier: margins.len(),
                mapped: self.class_scores.len(),
            });
        }

        let probabilities = softmax(&margins);
        let total: f64 = probabilities.iter().sum();
        if !((total - 1.0).abs() <= PROBABILITY_TOLERANCE) {
            return Err(InferenceError::Normalization(total));
        }

        let predicted = argmax(&probabilities);
        let all_class_probabilities = self
            .class_scores
            .iter()
            .copied()
            .zip(probabilities.iter().copied())
            .collect();

        let inference_time_us = start_time.elapsed().as_micros() as u64;
        log::debug!(
            "Predicted class {} (score {}, p={:.4}) in {}us",
            predicted,
            self.class_scores[predicted],
            probabilities[predicted],
            inference_time_us
        );

        Ok(PredictionResult {
            predicted_class_index: predicted,
            severity_score: self.class_scores[predicted],
            probability: probabilities[predicted],
            all_class_probabilities,
            margins,
            inference_time_us,
        })
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("layout_hash", &self.layout.hash())
            .field("features", &self.layout.len())
            .field("class_scores", &self.class_scores)
            .finish()
    }
}
