//! Error types for Authgate
//!
//! All handler errors are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::LOGIN_PATH;

/// Message shown when the protected data fetch fails for any reason.
///
/// Expired tokens and unreachable upstreams share it.
pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str =
    "Failed to fetch user data. Please try again or contact support.";

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// while serving a request. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed form fields (400)
    #[error("{0}")]
    InvalidInput(String),

    /// Upstream rejected the credentials or issued no usable token (401)
    #[error("{0}")]
    AuthFailed(String),

    /// Upstream unreachable, non-2xx or malformed (500)
    #[error("Upstream unavailable")]
    UpstreamUnavailable,

    /// No session token on a protected route (302 to login)
    #[error("Authentication required")]
    Unauthenticated,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::AuthFailed(_) => "auth_failed",
            AppError::UpstreamUnavailable => "upstream_unavailable",
            AppError::Unauthenticated => "unauthenticated",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body. `Unauthenticated` becomes a redirect.
    fn into_response(self) -> Response {
        use axum::Json;

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.error_type()]).inc();

        let (status, error_message) = match &self {
            AppError::Unauthenticated => {
                return (StatusCode::FOUND, [(header::LOCATION, LOGIN_PATH)]).into_response();
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::AuthFailed(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::UpstreamUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UPSTREAM_UNAVAILABLE_MESSAGE.to_string(),
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
