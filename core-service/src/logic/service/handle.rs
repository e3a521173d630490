//! Model Handle - the single active model
//!
//! Requests clone an `Arc` snapshot and never hold the lock while scoring.
//! A reload builds the whole replacement first and swaps it in one write;
//! if building fails the current model stays active.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::ServiceError;
use super::loaded::LoadedModel;
use super::types::ModelStatus;

#[derive(Debug, Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<LoadedModel>>>,
    last_error: RwLock<Option<String>>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl ModelHandle {
    /// Handle with no active model
    pub fn new() -> Self {
        Self::default()
    }

    /// Current model, if any
    pub fn snapshot(&self) -> Option<Arc<LoadedModel>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Make `model` active, returning the one it replaced
    pub fn activate(&self, model: LoadedModel) -> Option<Arc<LoadedModel>> {
        let model = Arc::new(model);
        log::info!(
            "Activating model: {} features, {} classes (layout {:08x})",
            model.layout().len(),
            model.num_classes(),
            model.layout().hash()
        );

        let previous = self.current.write().replace(model);
        *self.last_error.write() = None;
        previous
    }

    /// Load an artifact and activate it. On failure the active model is
    /// left untouched and the error is recorded for status reporting.
    pub fn load_from(&self, path: &Path, expected_sha256: Option<&str>) -> Result<Arc<LoadedModel>, ServiceError> {
        match LoadedModel::load(path, expected_sha256) {
            Ok(model) => {
                self.activate(model);
                self.snapshot().ok_or(ServiceError::Unavailable)
            }
            Err(e) => {
                log::error!("Failed to load model from {}: {}", path.display(), e);
                *self.last_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn record_inference(&self, elapsed_us: u64) {
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status(&self) -> ModelStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        let mut status = ModelStatus {
            inference_count: count,
            avg_latency_ms: avg,
            last_error: self.last_error.read().clone(),
            ..ModelStatus::default()
        };

        if let Some(model) = self.snapshot() {
            let source = model.source();
            status.model_loaded = true;
            status.explainer_ready = true;
            status.artifact_path = source.path.as_ref().map(|p| p.display().to_string());
            status.artifact_sha256 = source.digest.clone();
            status.feature_count = model.layout().len();
            status.class_count = model.num_classes();
            status.tree_count = source.tree_count;
            status.layout_hash = Some(format!("{:08x}", model.layout().hash()));
            status.loaded_at = Some(model.loaded_at());
        }

        status
    }
}
