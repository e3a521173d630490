//! Model Module - Multiclass Tree Ensemble
//!
//! - `xgboost` - serde mirror of the XGBoost JSON model
//! - `tree` / `ensemble` - native evaluation of the boosted trees
//! - `inference` - layout-checked prediction with severity mapping

pub mod ensemble;
pub mod inference;
pub mod tree;
pub mod xgboost;

// Re-export common types
pub use ensemble::{EnsembleError, TreeEnsemble};
pub use inference::{Classifier, InferenceEngine, InferenceError, PredictionResult};
pub use xgboost::XgbModelDocument;
