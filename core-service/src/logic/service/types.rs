use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::explain::{AttributionResult, RankedContribution};
use crate::logic::model::PredictionResult;

/// The parts of a reported violation the pipeline reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViolationInput {
    /// Offending HTML snippet
    pub affected_html_elements: String,
    /// Audit metadata and surrounding markup
    pub supplementary_information: String,
    pub violation_name: String,
}

/// Score plus its attribution
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedPrediction {
    pub prediction: PredictionResult,
    pub attribution: AttributionResult,
    /// Strongest contributions, by magnitude
    pub top_features: Vec<RankedContribution>,
}

/// Model handle status, for health and admin endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    pub explainer_ready: bool,
    pub artifact_path: Option<String>,
    pub artifact_sha256: Option<String>,
    pub feature_count: usize,
    pub class_count: usize,
    pub tree_count: usize,
    /// CRC32 of the feature layout, hex
    pub layout_hash: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub inference_count: u64,
    pub avg_latency_ms: f32,
    /// Most recent load failure, cleared by a successful load
    pub last_error: Option<String>,
}
