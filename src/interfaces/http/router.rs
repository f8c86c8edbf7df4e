//! HTTP router
//!
//! `/health` is a plain route; every other request falls through to the
//! stage pipeline. Layers (outermost first): trace, CORS, `Cache-Control:
//! no-cache`, request id.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Query, Request, State},
    http::{header, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::health;
use super::pipeline::{Pipeline, RequestContext};
use super::request_id::request_id_middleware;
use crate::application::ResourceStore;
use crate::domain::QueryParams;
use crate::shared::ApiError;

/// Largest request body accepted for writes.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Everything a request needs, injected once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResourceStore>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// State with the standard `echo` -> `latency` -> `resources` pipeline.
    pub fn new(store: Arc<ResourceStore>) -> Self {
        let pipeline = Arc::new(Pipeline::standard(store.clone()));
        Self { store, pipeline }
    }

    pub fn with_pipeline(store: Arc<ResourceStore>, pipeline: Pipeline) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .fallback(dispatch)
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let query = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| QueryParams::from_pairs(pairs))
        .unwrap_or_else(|e| {
            tracing::debug!("Ignoring undecodable query string: {}", e);
            QueryParams::new()
        });

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return ApiError::InvalidBody(e.to_string()).into_response(),
    };

    let ctx = RequestContext::new(parts.method, parts.uri.path(), query).with_body(body);
    state.pipeline.run(ctx).await
}
