//! AccessGuru ML API Server
//!
//! Scores accessibility violations reported by the browser extension and
//! explains each score with per-feature contributions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ACCESSGURU API                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐  │
//! │  │  Routes   │  │  Validation   │  │  Blocking pool      │  │
//! │  │  (Axum)   │──│  (validator)  │──│  (spawn_blocking)   │  │
//! │  └───────────┘  └───────────────┘  └──────────┬──────────┘  │
//! │                                               ▼             │
//! │                               ┌───────────────────────────┐ │
//! │                               │  accessguru-core pipeline │ │
//! │                               └───────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod extract;
mod handlers;
mod models;


use std::net::SocketAddr;
use std::sync::Arc;

use accessguru_core::{ModelHandle, PredictionService};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(config.log_json);

    tracing::info!("AccessGuru API starting ({})...", config.environment);
    if !config.is_production() {
        tracing::debug!("Config: {:?}", config);
    }

    let handle = Arc::new(ModelHandle::new());

    // A missing artifact leaves the server up in degraded mode
    match handle.load_from(&config.artifact_path, config.artifact_sha256.as_deref()) {
        Ok(model) => tracing::info!(
            "Model loaded: {} features, {} classes",
            model.layout().len(),
            model.num_classes()
        ),
        Err(e) => tracing::warn!(
            "Model unavailable ({}), serving degraded until /admin/reload succeeds",
            e
        ),
    }

    let state = AppState {
        service: PredictionService::new(handle, config.top_features),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Text or JSON log lines; `log` records from the core crate are bridged in.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "accessguru_api=debug,accessguru_core=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub service: PredictionService,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/shap", post(handlers::predict::shap))
        .route("/predict-with-shap", post(handlers::predict::predict_with_shap))
        .route("/admin/reload", post(handlers::admin::reload))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
