use std::sync::Arc;

use anyhow::Context;
use axum::{Json, Router, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use aqmon_core::{Config, Dashboard};

use crate::api;

/// Full application: `/api` routes, JSON 404 fallback, CORS and request tracing.
pub fn app(dashboard: Arc<Dashboard>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(dashboard)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let dashboard = Arc::new(Dashboard::from_config(config)?);

    if !dashboard.is_configured() {
        warn!("API_KEY not found; set it in the environment or run `aqmon configure`");
    }

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Air quality monitor API running at http://{addr}/api");

    axum::serve(listener, app(dashboard))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
}
