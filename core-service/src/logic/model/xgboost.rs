//! XGBoost JSON model document
//!
//! Serde mirror of the subset of XGBoost's JSON model format (`save_model`
//! with a `.json` path) needed to rebuild a gbtree ensemble. XGBoost stores
//! learner parameters as strings, so numeric parsing happens in
//! `TreeEnsemble::from_document`.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbModelDocument {
    pub learner: XgbLearner,
    /// XGBoost version that wrote the document, e.g. [2, 0, 3]
    #[serde(default)]
    pub version: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbLearner {
    pub gradient_booster: XgbGradientBooster,
    pub learner_model_param: XgbLearnerParam,
    pub objective: XgbObjective,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbGradientBooster {
    pub name: String,
    pub model: XgbGbtreeModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbGbtreeModel {
    pub trees: Vec<XgbTree>,
    /// Output group (class) of each tree
    pub tree_info: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbLearnerParam {
    /// Scalar ("5E-1") or per-class vector ("[5E-1,5E-1]")
    pub base_score: String,
    #[serde(default)]
    pub num_class: String,
    pub num_feature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbObjective {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbTree {
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i64>,
    /// Threshold for split nodes, leaf value for leaves
    pub split_conditions: Vec<f32>,
    #[serde(default, deserialize_with = "flags")]
    pub default_left: Vec<bool>,
    /// Node cover (hessian sum)
    pub sum_hessian: Vec<f32>,
}

/// XGBoost writes `default_left` as 0/1 integers; older dumps use booleans
fn flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u8),
    }

    let raw = Vec::<Flag>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|f| match f {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
        .collect())
}

/// Parse XGBoost's `base_score` string into one or more values
pub fn parse_base_score(raw: &str) -> Option<Vec<f64>> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    trimmed
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect()
}

/// Parse a stringly-typed count, treating an empty string as zero
pub fn parse_count(raw: &str) -> Option<usize> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse().ok()
}
