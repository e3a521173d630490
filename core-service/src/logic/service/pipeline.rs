//! Prediction Service - extract → predict (→ explain)
//!
//! Synchronous and CPU-bound; async callers should run it on a blocking
//! thread.

use std::sync::Arc;
use std::time::Instant;

use super::error::ServiceError;
use super::handle::ModelHandle;
use super::loaded::LoadedModel;
use super::types::{ExplainedPrediction, ViolationInput};
use crate::constants::DEFAULT_TOP_FEATURES;
use crate::logic::explain::rank;
use crate::logic::model::PredictionResult;

#[derive(Debug, Clone)]
pub struct PredictionService {
    handle: Arc<ModelHandle>,
    top_n: usize,
}

impl PredictionService {
    pub fn new(handle: Arc<ModelHandle>, top_n: usize) -> Self {
        Self { handle, top_n }
    }

    pub fn with_handle(handle: Arc<ModelHandle>) -> Self {
        Self::new(handle, DEFAULT_TOP_FEATURES)
    }

    pub fn handle(&self) -> &Arc<ModelHandle> {
        &self.handle
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    fn model(&self) -> Result<Arc<LoadedModel>, ServiceError> {
        self.handle.snapshot().ok_or(ServiceError::Unavailable)
    }

    /// Score-only mode
    pub fn score(&self, input: &ViolationInput) -> Result<PredictionResult, ServiceError> {
        let start = Instant::now();
        let model = self.model()?;

        let vector = model.extract(input);
        let prediction = model.predict(&vector)?;

        self.handle.record_inference(start.elapsed().as_micros() as u64);
        Ok(prediction)
    }

    /// Score-with-explanation mode
    pub fn score_with_explanation(&self, input: &ViolationInput) -> Result<ExplainedPrediction, ServiceError> {
        let start = Instant::now();
        let model = self.model()?;

        let vector = model.extract(input);
        let prediction = model.predict(&vector)?;
        let attribution = model.explain(&vector, prediction.predicted_class_index)?;
        let top_features = rank(&attribution, self.top_n);

        self.handle.record_inference(start.elapsed().as_micros() as u64);
        Ok(ExplainedPrediction {
            prediction,
            attribution,
            top_features,
        })
    }
}
