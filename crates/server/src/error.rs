use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use threads_feed_core::CoreError;

/// Error type for feed API responses.
#[derive(Debug)]
pub enum ApiError {
    RateLimited(String),
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited(msg) => write!(f, "rate_limited: {msg}"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Self::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "API limit reached", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data", msg),
        };

        let body = json!({ "success": false, "error": error, "details": details });
        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        if e.is_rate_limited() {
            Self::RateLimited(e.to_string())
        } else {
            Self::Internal(e.to_string())
        }
    }
}
