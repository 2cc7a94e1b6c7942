//! HTTP surface: routing, CORS, upload limits and request timeouts around
//! the core transform pipeline.

mod error;
mod form;
mod routes;

pub use error::ApiError;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use pixelperfect_core::{Config, ImageTransformer};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    transformer: Arc<ImageTransformer>,
    timeout: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            transformer: Arc::new(ImageTransformer::new(config)),
            timeout: Duration::from_millis(config.limits.transform_timeout_ms),
        }
    }
}

/// Build the application router.
pub fn router(config: &Config) -> anyhow::Result<Router> {
    let cors = cors_layer(&config.server.cors_allow_origins)?;

    Ok(Router::new()
        .route("/health", get(routes::health))
        .route("/api/resize", post(routes::resize))
        .layer(DefaultBodyLimit::max(config.limits.max_upload_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(config)))
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Bind and serve until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let app = router(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        "Listening on http://{} (upload limit {}MB, timeout {}ms)",
        addr,
        config.limits.max_upload_size_mb,
        config.limits.transform_timeout_ms
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
