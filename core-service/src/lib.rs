//! AccessGuru Core - Severity Scoring Pipeline
//!
//! Turns an accessibility violation (HTML snippet + context) into a severity
//! score (2-5) and explains that score with per-feature contributions.
//!
//! ```text
//! artifact ──▶ features ──▶ model (inference) ──▶ explain (attribution) ──▶ service
//! ```

pub mod constants;
pub mod logic;

pub use logic::artifact::{ArtifactBlob, ArtifactError, ModelArtifact};
pub use logic::explain::{AttributionResult, Influence, RankedContribution};
pub use logic::features::{FeatureLayout, FeatureVector, TagVocabulary};
pub use logic::model::PredictionResult;
pub use logic::service::{
    ExplainedPrediction, LoadedModel, ModelHandle, ModelStatus, PredictionService,
    ServiceError, ViolationInput,
};
pub use logic::severity::SeverityLevel;
