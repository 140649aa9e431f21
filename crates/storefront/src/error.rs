//! Errors returned by the REST function client.
//!
//! The function answers every handler failure with `{ "error": string }` and
//! HTTP 400, and configuration failures with HTTP 500. Everything else is a
//! transport problem.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Longest slice of a non-JSON error body kept in the message.
const MAX_RAW_BODY_CHARS: usize = 200;

/// Message the function uses when no user was resolved from the token.
const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Errors that can occur when talking to the REST function or the database.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No user could be resolved from the bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Build an error from a non-success response.
    ///
    /// Uses the `error` field of a JSON body when present, otherwise a
    /// truncated copy of the raw body.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
            |_| body.chars().take(MAX_RAW_BODY_CHARS).collect::<String>(),
            |b| b.error,
        );

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST if message == UNAUTHORIZED_MESSAGE => {
                Self::Unauthorized(message)
            }
            _ => Self::Service {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether a read may be retried once against the database directly.
    ///
    /// True for transport failures and 5xx answers; client errors are final.
    #[must_use]
    pub const fn is_fallback_eligible(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Service { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of the failed response, when there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            _ => None,
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message_is_used() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, r#"{"error":"Unknown set"}"#);
        assert_eq!(err.to_string(), "Service error (400): Unknown set");
        assert!(!err.is_fallback_eligible());
    }

    #[test]
    fn test_raw_body_is_truncated() {
        let body = "x".repeat(1000);
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, &body);
        let ApiError::Service { status, message } = &err else {
            panic!("expected service error");
        };
        assert_eq!(*status, 502);
        assert_eq!(message.len(), MAX_RAW_BODY_CHARS);
        assert!(err.is_fallback_eligible());
    }

    #[test]
    fn test_unauthorized_message_maps_to_variant() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, r#"{"error":"Unauthorized"}"#);
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_server_config_failure_is_fallback_eligible() {
        let err = ApiError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Missing environment"}"#,
        );
        assert!(err.is_fallback_eligible());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(!err.is_fallback_eligible());
    }
}
