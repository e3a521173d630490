//! Explain Module - Per-feature attribution of a prediction
//!
//! - `tree_shap` - attribution engine over the tree ensemble
//! - `normalizer` - raw engine output → canonical contribution vector
//! - `engine` - explain + rank for the prediction service

pub mod engine;
pub mod normalizer;
pub mod tree_shap;
pub mod types;

pub use engine::{explain, get_description, rank};
pub use normalizer::{AttributionError, ShapeLayout};
pub use tree_shap::{AttributionEngine, TreeShapExplainer};
pub use types::{
    AttributionResult, ContributionMap, Influence, RankedContribution, RawAttribution,
    RawExplanation,
};
