//! Prediction handlers

use accessguru_core::ViolationInput;
use axum::{extract::State, Json};

use super::run_blocking;
use crate::extract::ValidatedJson;
use crate::models::{PredictWithShapOutput, PredictionInput, PredictionOutput, ShapOutput};
use crate::{AppResult, AppState};

/// Severity score only
pub async fn predict(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PredictionInput>,
) -> AppResult<Json<PredictionOutput>> {
    let input = ViolationInput::from(req);
    let service = state.service.clone();

    let result = run_blocking(move || service.score(&input)).await?;

    tracing::debug!(
        score = result.severity_score,
        probability = result.probability,
        "Prediction served"
    );
    Ok(Json(PredictionOutput::from(&result)))
}

/// Feature attributions for the predicted class
pub async fn shap(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PredictionInput>,
) -> AppResult<Json<ShapOutput>> {
    let input = ViolationInput::from(req);
    let service = state.service.clone();

    let explained = run_blocking(move || service.score_with_explanation(&input)).await?;
    Ok(Json(ShapOutput::from(explained)))
}

/// Prediction and attributions in one response
pub async fn predict_with_shap(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PredictionInput>,
) -> AppResult<Json<PredictWithShapOutput>> {
    let input = ViolationInput::from(req);
    let service = state.service.clone();

    let explained = run_blocking(move || service.score_with_explanation(&input)).await?;
    Ok(Json(PredictWithShapOutput::from(explained)))
}
