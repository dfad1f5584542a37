//! Anchor ↔ document-id codec
//!
//! Anchors are slash-delimited `/ai/value[/ai/value]*` paths; document ids
//! are the same segments joined with underscores. No `/` survives into a
//! store key, which keeps ids portable as partition keys and file names.

use crate::error::CoreError;
use crate::model::{DocumentId, Qualifier};
use thiserror::Error;

/// Error raised by the path codec
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path was empty or whitespace only
    #[error("anchor path is empty")]
    Empty,
}

impl From<PathError> for CoreError {
    fn from(e: PathError) -> Self {
        CoreError::validation(e.to_string())
    }
}

/// Convert an anchor path into its flat document id.
///
/// Splits on `/`, drops empty segments, joins with `_`:
/// `/01/123/21/X` → `01_123_21_X`.
pub fn path_to_id(path: &str) -> Result<DocumentId, PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(DocumentId::new(segments.join("_")))
}

/// Convert a flat document id back into its anchor path.
///
/// `01_123_21_X` → `/01/123/21/X`.
pub fn id_to_path(id: &DocumentId) -> String {
    format!("/{}", id.as_str().replace('_', "/"))
}

/// Parse a qualifier tail into ordered `(ai, value)` pairs.
///
/// Splits on `/`, drops empty segments, and groups into pairs. A trailing
/// odd segment is silently ignored.
pub fn parse_qualifier_path(qualifier_path: &str) -> Vec<Qualifier> {
    let segments: Vec<&str> = qualifier_path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    segments
        .chunks_exact(2)
        .map(|pair| Qualifier::new(pair[0], pair[1]))
        .collect()
}
