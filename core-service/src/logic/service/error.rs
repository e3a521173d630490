use thiserror::Error;

use crate::logic::artifact::ArtifactError;
use crate::logic::explain::AttributionError;
use crate::logic::model::InferenceError;

/// Failures surfaced by the prediction service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No model is active
    #[error("Model artifact is not loaded")]
    Unavailable,

    /// The attribution engine returned a shape the normalizer can't read
    #[error("Attribution shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Feature vector and loaded artifact disagree
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("Artifact load failed: {0}")]
    ArtifactLoad(#[from] ArtifactError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable category
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unavailable => "unavailable",
            ServiceError::ShapeMismatch(_) => "shape_mismatch",
            ServiceError::ConfigurationMismatch(_) => "configuration_mismatch",
            ServiceError::ArtifactLoad(_) | ServiceError::Internal(_) => "internal",
        }
    }
}

impl From<InferenceError> for ServiceError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::LayoutMismatch(_)
            | InferenceError::ClassCount { .. }
            | InferenceError::FeatureCount { .. } => {
                ServiceError::ConfigurationMismatch(err.to_string())
            }
            InferenceError::Normalization(_) => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<AttributionError> for ServiceError {
    fn from(err: AttributionError) -> Self {
        match err {
            AttributionError::ShapeMismatch(msg) => ServiceError::ShapeMismatch(msg),
            AttributionError::LayoutMismatch(e) => ServiceError::ConfigurationMismatch(e.to_string()),
        }
    }
}
