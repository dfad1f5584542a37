//! Store error taxonomy
//!
//! These errors have specific semantics important for the merge engine:
//! - `PreconditionFailed` indicates a CAS conflict (retry is appropriate)
//! - `Unavailable` indicates the backend is unreachable or timed out
//! - Others are generally fatal for the operation

use thiserror::Error;

/// Error type for document store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error talking to the backend
    #[error("I/O error: {0}")]
    Io(String),

    /// Document not found where one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conditional write denied (CAS conflict)
    ///
    /// Expected under contention; triggers the caller's retry loop rather
    /// than being treated as fatal.
    #[error("Precondition failed (CAS conflict)")]
    PreconditionFailed,

    /// Backend unreachable or timed out
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Stored bytes failed to decode as a document
    #[error("Corrupt document: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
