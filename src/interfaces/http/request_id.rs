//! `X-Request-Id` correlation
//!
//! A usable client id is kept, anything else is replaced by a fresh UUID.
//! The pipeline runs inside a `request` span tagged with the id, and the id
//! is returned on every response, errors included.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id that is reused as-is.
const MAX_CLIENT_ID_LEN: usize = 128;

pub async fn request_id_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = client_request_id(request.headers())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn client_request_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    if raw.is_empty() || raw.len() > MAX_CLIENT_ID_LEN {
        return None;
    }
    Some(raw.to_string())
}
