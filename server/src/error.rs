//! HTTP mapping for search errors. Bodies are `{"error": "message"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use search_core::SearchError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 401
    Unauthorized(String),
    /// 404
    NotFound(String),
    /// 503, no index has been built yet
    ServiceUnavailable(String),
    /// 500
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let msg = err.to_string();
        match err {
            SearchError::InvalidInput { .. } => ApiError::BadRequest(msg),
            SearchError::UnknownTerm(_) => ApiError::NotFound(msg),
            SearchError::IndexNotBuilt { .. } => ApiError::ServiceUnavailable(msg),
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::Internal(msg)
            }
        }
    }
}
