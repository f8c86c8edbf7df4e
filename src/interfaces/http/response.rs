//! JSON / JSONP rendering and the error response mapping.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::domain::QueryParams;
use crate::shared::ApiError;

/// Query parameter naming the JSONP callback.
pub const CALLBACK_PARAM: &str = "callback";

/// Render `body` as JSON, or as a JSONP script when the request carries a
/// usable `callback` parameter.
pub fn render<T: Serialize>(status: StatusCode, body: &T, query: &QueryParams) -> Response {
    let callback = query
        .get(CALLBACK_PARAM)
        .map(sanitize_callback)
        .filter(|name| !name.is_empty());

    let Some(callback) = callback else {
        return (status, Json(body)).into_response();
    };

    match serde_json::to_string(body) {
        Ok(payload) => {
            let script = jsonp_script(&callback, &payload);
            let mut response = (status, script).into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/javascript; charset=utf-8"),
            );
            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
            response
        }
        Err(e) => {
            tracing::error!("Failed to serialize JSONP payload: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Strip everything that is not valid in a dotted JS callback path.
pub fn sanitize_callback(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '[' | ']'))
        .collect()
}

fn jsonp_script(callback: &str, payload: &str) -> String {
    // U+2028 / U+2029 are valid in JSON strings but terminate JS lines.
    let payload = payload
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");
    format!("/**/ typeof {callback} === 'function' && {callback}({payload});")
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownResource(_) | ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
