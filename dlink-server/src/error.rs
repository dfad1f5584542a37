//! Server error type with HTTP status mapping
//!
//! The single place where typed error kinds become HTTP responses. Bodies
//! follow RFC-7807 (`{type, title, status, detail}`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dlink_core::CoreError;
use dlink_store::StoreError;
use dlink_toolkit::ToolkitError;
use serde::Serialize;
use thiserror::Error;

/// Server error type wrapping the inner layers' typed kinds
#[derive(Error, Debug)]
pub enum ServerError {
    /// Core engine error (carries its own kind)
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Document store error
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Toolkit error outside the compression/decompression paths
    #[error("{0}")]
    Toolkit(#[from] ToolkitError),

    /// Generic bad request error
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Conditional write denied after retries (409)
    #[error("{0}")]
    Conflict(String),
}

impl ServerError {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ServerError::BadRequest(msg.into())
    }

    /// Create an unauthorized error (401)
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ServerError::Unauthorized(msg.into())
    }

    /// Create a not found error (404)
    pub fn not_found(msg: impl Into<String>) -> Self {
        ServerError::NotFound(msg.into())
    }

    /// Create a conflict error (409)
    pub fn conflict(msg: impl Into<String>) -> Self {
        ServerError::Conflict(msg.into())
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Core(CoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Core(CoreError::Conflict(_)) => StatusCode::CONFLICT,
            ServerError::Core(CoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Core(CoreError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,

            ServerError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Store(StoreError::PreconditionFailed) => StatusCode::CONFLICT,
            ServerError::Store(StoreError::Io(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Store(StoreError::Corrupt(_)) => StatusCode::INTERNAL_SERVER_ERROR,

            // Toolkit failures outside compression paths are internal;
            // the compression handlers map their own errors to 400.
            ServerError::Toolkit(_) => StatusCode::INTERNAL_SERVER_ERROR,

            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// RFC-7807 problem type IRI for this error
    pub fn problem_type(&self) -> &'static str {
        use dlink_vocab::errors;

        match self.status_code().as_u16() {
            400 => errors::VALIDATION,
            401 => errors::UNAUTHORIZED,
            404 => errors::NOT_FOUND,
            409 => errors::CONFLICT,
            503 => errors::UPSTREAM_UNAVAILABLE,
            _ => errors::INTERNAL,
        }
    }
}

/// RFC-7807 problem response body
#[derive(Debug, Serialize)]
pub struct Problem {
    /// Problem type IRI
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short, human-readable summary of the problem type
    pub title: String,
    /// HTTP status code
    pub status: u16,
    /// Human-readable explanation specific to this occurrence
    pub detail: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal server error");
        }

        let body = Problem {
            problem_type: self.problem_type().to_string(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            status: status.as_u16(),
            detail: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            format!(
                r#"{{"type":"{}","title":"Error","status":{},"detail":"{}"}}"#,
                self.problem_type(),
                status.as_u16(),
                self
            )
        });

        (
            status,
            [("content-type", "application/problem+json")],
            json,
        )
            .into_response()
    }
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_kinds_map_to_spec_statuses() {
        let cases = [
            (CoreError::validation("x"), StatusCode::BAD_REQUEST),
            (CoreError::not_found("x"), StatusCode::NOT_FOUND),
            (CoreError::conflict("x"), StatusCode::CONFLICT),
            (CoreError::unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
            (CoreError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::Core(err).status_code(), status);
        }
    }

    #[test]
    fn store_unavailability_is_503() {
        assert_eq!(
            ServerError::Store(StoreError::unavailable("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn problem_types_follow_status() {
        let err = ServerError::bad_request("nope");
        assert_eq!(err.problem_type(), dlink_vocab::errors::VALIDATION);
        let err = ServerError::not_found("gone");
        assert_eq!(err.problem_type(), dlink_vocab::errors::NOT_FOUND);
    }
}
