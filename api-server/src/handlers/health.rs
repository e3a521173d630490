//! Health check handlers

use accessguru_core::ModelStatus;
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
    artifacts_loaded: bool,
    explainer_ready: bool,
    model: ModelStatus,
}

/// Service banner
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let status = state.service.handle().status();

    Json(json!({
        "message": "AccessGuru Severity Prediction API",
        "status": "running",
        "model_loaded": status.model_loaded,
        "artifacts_loaded": status.model_loaded,
        "explainer_ready": status.explainer_ready,
        "endpoints": {
            "predict": "/predict",
            "shap": "/shap",
            "predict_with_shap": "/predict-with-shap",
            "health": "/health",
            "reload": "/admin/reload"
        }
    }))
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.service.handle().status();

    Json(HealthResponse {
        status: if model.model_loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded: model.model_loaded,
        artifacts_loaded: model.model_loaded,
        explainer_ready: model.explainer_ready,
        model,
    })
}
