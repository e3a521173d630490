//! Service Module - Composition root of the scoring pipeline
//!
//! - `handle` - process-wide active model with atomic reload
//! - `loaded` - immutable model bundle built from an artifact
//! - `pipeline` - score and score-with-explanation

pub mod error;
pub mod handle;
pub mod loaded;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ServiceError;
pub use handle::ModelHandle;
pub use loaded::{LoadedModel, ModelSource};
pub use pipeline::PredictionService;
pub use types::{ExplainedPrediction, ModelStatus, ViolationInput};
