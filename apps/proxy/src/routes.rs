//! API routes for the analyze proxy.
//!
//! The surface is intentionally one operation: `POST /api/analyze`. Any
//! other method on the path is answered with 405 so clients cannot probe
//! the relay through side doors.

use crate::config::ProxyConfig;
use crate::error::ApiError;
use crate::relay::Relay;
use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Slack on top of the upstream timeout before the whole request is cut off.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

/// Application state shared across handlers
pub struct AppState {
    pub relay: Relay,
}

type AppStateArc = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

// ============================================================================
// Analyze Route
// ============================================================================

pub fn analyze_routes() -> Router<AppStateArc> {
    Router::new().route(
        "/api/analyze",
        post(analyze).fallback(method_not_allowed),
    )
}

async fn analyze(
    State(state): State<AppStateArc>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    info!("  Analyze request: {} prompt chars", req.text.len());
    let envelope = state.relay.forward(&req.text).await?;
    Ok(Json(envelope))
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

// ============================================================================
// Server
// ============================================================================

/// Build the full application router.
pub fn app(config: &ProxyConfig) -> Router {
    let state = Arc::new(AppState {
        relay: Relay::new(config),
    });

    Router::new()
        .merge(analyze_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(
            config.upstream_timeout() + REQUEST_TIMEOUT_MARGIN,
        ))
}

/// Run the HTTP server
pub async fn serve(config: &ProxyConfig) -> anyhow::Result<()> {
    let app = app(config);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("  Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
