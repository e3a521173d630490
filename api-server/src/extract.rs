//! Request extractors

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::AppError;

/// JSON body that has passed its `validator` rules.
///
/// Syntax errors, missing fields, wrong types and rule violations all come
/// back as `AppError::MalformedInput`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedInput(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::MalformedInput(e.to_string()))?;

        Ok(ValidatedJson(value))
    }
}
