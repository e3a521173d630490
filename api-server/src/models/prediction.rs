//! Prediction models

use std::collections::BTreeMap;

use accessguru_core::logic::explain::ContributionMap;
use accessguru_core::logic::severity::severity_name;
use accessguru_core::{
    ExplainedPrediction, Influence, PredictionResult, SeverityLevel, ViolationInput,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Violation reported by the browser extension
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictionInput {
    #[validate(length(max = 200000))]
    pub affected_html_elements: String,
    #[validate(length(max = 200000))]
    pub supplementary_information: String,
    #[validate(length(max = 1000))]
    pub violation_name: String,
    pub wcag_reference: String,
    #[serde(rename = "web_URL")]
    pub web_url: String,
    pub domain_category: String,
}

impl From<PredictionInput> for ViolationInput {
    fn from(input: PredictionInput) -> Self {
        Self {
            affected_html_elements: input.affected_html_elements,
            supplementary_information: input.supplementary_information,
            violation_name: input.violation_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionOutput {
    pub predicted_score: i32,
    pub severity_name: String,
    /// Absent for scores outside the 2-5 scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_description: Option<&'static str>,
    pub prediction_probability: f64,
    /// Severity score → probability
    pub all_probabilities: BTreeMap<i32, f64>,
}

impl From<&PredictionResult> for PredictionOutput {
    fn from(result: &PredictionResult) -> Self {
        Self {
            predicted_score: result.severity_score,
            severity_name: severity_name(result.severity_score),
            severity_description: SeverityLevel::from_score(result.severity_score)
                .map(SeverityLevel::description),
            prediction_probability: result.probability,
            all_probabilities: result.all_class_probabilities.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopFeature {
    pub feature: String,
    pub shap_value: f64,
    pub influence: Influence,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShapOutput {
    pub predicted_score: i32,
    pub severity_name: String,
    /// Every feature, in model order
    pub shap_values: ContributionMap,
    pub top_features: Vec<TopFeature>,
    pub base_value: f64,
}

impl From<ExplainedPrediction> for ShapOutput {
    fn from(explained: ExplainedPrediction) -> Self {
        let score = explained.prediction.severity_score;
        Self {
            predicted_score: score,
            severity_name: severity_name(score),
            shap_values: explained.attribution.contributions,
            top_features: explained
                .top_features
                .into_iter()
                .map(|c| TopFeature {
                    feature: c.feature,
                    shap_value: c.contribution,
                    influence: c.influence,
                    description: c.description,
                })
                .collect(),
            base_value: explained.attribution.baseline,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictWithShapOutput {
    pub prediction: PredictionOutput,
    pub explanation: ShapOutput,
}

impl From<ExplainedPrediction> for PredictWithShapOutput {
    fn from(explained: ExplainedPrediction) -> Self {
        Self {
            prediction: PredictionOutput::from(&explained.prediction),
            explanation: ShapOutput::from(explained),
        }
    }
}
