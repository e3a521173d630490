//! Central Configuration Constants
//!
//! Single source of truth for core defaults.

/// Default location of the model artifact blob
pub const DEFAULT_ARTIFACT_PATH: &str = "models/model_artifacts.json";

/// Number of entries in the ranked contribution view
pub const DEFAULT_TOP_FEATURES: usize = 10;

/// Reserved tag name used when a snippet has no recognizable root tag
pub const UNKNOWN_TAG: &str = "unknown";

/// Tolerance used when checking that class probabilities sum to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;
