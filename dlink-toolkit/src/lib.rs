//! GS1 syntax/compression toolkit capability
//!
//! The resolver treats the GS1 Digital Link toolkit as an opaque
//! capability: syntax validation, compression, decompression, and
//! structural analysis of Digital Link paths. Implementations may wrap a
//! subprocess ([`subprocess::SubprocessToolkit`]) or a pure in-process
//! port; the pipeline never assumes subprocess semantics.
//!
//! Adapters never retry on their own; the pipeline decides.

pub mod subprocess;

pub use subprocess::SubprocessToolkit;

use async_trait::async_trait;
use dlink_core::model::Qualifier;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Error type for toolkit operations
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// The toolkit itself rejected the input (opaque error string)
    #[error("{0}")]
    Tool(String),

    /// The toolkit call exceeded its bounded timeout; the process tree was
    /// terminated. Carries whatever partial output was captured.
    #[error("toolkit timed out after {elapsed:?}: {partial_output}")]
    Timeout {
        elapsed: Duration,
        partial_output: String,
    },

    /// Spawning or talking to the toolkit process failed
    #[error("toolkit process failure: {0}")]
    Process(String),

    /// The toolkit produced output we could not parse
    #[error("unparseable toolkit output: {0}")]
    Parse(String),
}

/// Result type for toolkit operations
pub type ToolkitResult<T> = std::result::Result<T, ToolkitError>;

/// Structural breakdown of a GS1 Digital Link path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalLinkParts {
    /// Primary identifier pairs, e.g. `{"01": "09506000134376"}`
    #[serde(default)]
    pub identifiers: Vec<Qualifier>,
    /// Qualifier pairs, e.g. `{"10": "LOT01"}`
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    /// GS1 data attributes carried in the query string
    #[serde(default)]
    pub data_attributes: Vec<Qualifier>,
    /// Non-GS1 key/value pairs the toolkit passed through
    #[serde(default)]
    pub other: Vec<String>,
}

/// Capability contract over the GS1 Digital Link toolkit
#[async_trait]
pub trait Toolkit: Debug + Send + Sync {
    /// True iff the toolkit reports success and at least one identifier.
    async fn test_syntax(&self, path: &str) -> ToolkitResult<bool>;

    /// Compress a Digital Link into its compressed path form.
    async fn compress(&self, link: &str) -> ToolkitResult<String>;

    /// Expand a compressed path back into its structural parts.
    async fn uncompress(&self, compressed_path: &str) -> ToolkitResult<DigitalLinkParts>;

    /// Structural analysis of an uncompressed link.
    async fn analyze(&self, link: &str) -> ToolkitResult<DigitalLinkParts>;
}
