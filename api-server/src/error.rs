//! Error handling

use accessguru_core::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Model not loaded
    #[error("model unavailable")]
    Unavailable,

    // Request errors
    #[error("malformed input: {0}")]
    MalformedInput(String),

    // Attribution engine broke its output contract
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    // Vector and artifact disagree
    #[error("configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    // Generic errors
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unavailable => "unavailable",
            AppError::MalformedInput(_) => "malformed_input",
            AppError::ShapeMismatch(_) => "shape_mismatch",
            AppError::ConfigurationMismatch(_) => "configuration_mismatch",
            AppError::InternalError(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Model not loaded. Please check server logs.",
            ),
            AppError::MalformedInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::ShapeMismatch(msg) => {
                tracing::error!("Attribution shape mismatch: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.as_str())
            }
            AppError::ConfigurationMismatch(msg) => {
                tracing::error!("Configuration mismatch: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Feature layout does not match the loaded model",
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": self.kind(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable => AppError::Unavailable,
            ServiceError::ShapeMismatch(msg) => AppError::ShapeMismatch(msg),
            ServiceError::ConfigurationMismatch(msg) => AppError::ConfigurationMismatch(msg),
            ServiceError::ArtifactLoad(e) => AppError::InternalError(e.to_string()),
            ServiceError::Internal(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("blocking task failed: {}", err))
    }
}
