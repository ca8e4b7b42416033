//! API error responses.
//!
//! Execution outcomes, including student-code failures, are not API errors;
//! they return 200 with an [`praxis_types::ExecutionResult`] payload. This
//! module covers the boundary failures: auth, validation, rate limiting, and
//! anything that panicked downstream.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use praxis_types::ErrorCode;

use crate::sanitize::sanitize_error_message;

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_code: ErrorCode,
    detail: String,
    timestamp: String,
}

impl ApiError {
    #[must_use]
    pub fn auth_failed() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: ErrorCode::AuthFailed,
            message: "Invalid or missing API key".to_string(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::InvalidInput,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rate_limited() -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: ErrorCode::RateLimitExceeded,
            message: "Too many requests. Please slow down.".to_string(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: ErrorCode::InternalError,
            message: "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_code: self.code,
            detail: sanitize_error_message(&self.message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Panic handler for the catch-panic layer: the panic payload is logged, the
/// caller sees only a sanitized 500.
pub fn handle_panic(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::internal().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_error_kinds() {
        assert_eq!(ApiError::auth_failed().status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::invalid_input("bad").status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::rate_limited().status,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::internal().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
