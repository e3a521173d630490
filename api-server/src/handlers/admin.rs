//! Admin handlers

use accessguru_core::ModelStatus;
use axum::{extract::State, Json};

use super::run_blocking;
use crate::{AppResult, AppState};

/// Reload the artifact from the configured path.
///
/// The new model only replaces the active one once it has fully loaded.
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ModelStatus>> {
    let handle = state.service.handle().clone();
    let path = state.config.artifact_path.clone();
    let checksum = state.config.artifact_sha256.clone();

    tracing::info!("Reloading model artifact from {}", path.display());
    run_blocking(move || handle.load_from(&path, checksum.as_deref()).map(|_| ())).await?;

    Ok(Json(state.service.handle().status()))
}
