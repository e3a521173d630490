//! HTTP handlers

pub mod admin;
pub mod health;
pub mod predict;

use accessguru_core::ServiceError;

use crate::AppResult;

/// Run synchronous pipeline work on tokio's blocking pool
pub(crate) async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}
