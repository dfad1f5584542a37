//! Typed error kinds shared across the core engines
//!
//! Inner layers raise these kinds and never format HTTP responses; the
//! server boundary owns the translation to status codes and RFC-7807
//! problem bodies.

use thiserror::Error;

/// Core error type classifying failures by resolution semantics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Anchor, input-shape, or GS1 syntax violation
    #[error("{0}")]
    Validation(String),

    /// Missing document, qualifier match, or linktype
    #[error("{0}")]
    NotFound(String),

    /// Conditional write denied after bounded retries
    #[error("{0}")]
    Conflict(String),

    /// Store unreachable or timed out
    #[error("{0}")]
    Unavailable(String),

    /// Everything else
    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    /// Create a validation error (400 at the boundary)
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    /// Create a not-found error (404 at the boundary)
    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }

    /// Create a conflict error (409 at the boundary)
    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }

    /// Create an upstream-unavailable error (503 at the boundary)
    pub fn unavailable(msg: impl Into<String>) -> Self {
        CoreError::Unavailable(msg.into())
    }

    /// Create an internal error (500 at the boundary)
    pub fn internal(msg: impl Into<String>) -> Self {
        CoreError::Internal(msg.into())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
