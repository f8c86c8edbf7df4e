//! Health check endpoint

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::interfaces::http::router::AppState;

/// Service health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub resources: usize,
}

/// `GET /health`. Served outside the pipeline, so it is never delayed.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        resources: state.store.resource_names().await.len(),
    })
}
