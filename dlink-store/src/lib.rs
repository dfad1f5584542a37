//! Document store contract for the dlink resolver
//!
//! A key/value contract over `DocumentId → ResolverDocument` shared by the
//! Resolver read path and the Data-Entry write path. Backends expose ETags
//! so the merge engine can run its optimistic-concurrency retry loop.
//!
//! Two backends ship here:
//! - [`MemoryStore`] - `Arc<RwLock<HashMap>>`, for tests and ephemeral runs
//! - [`FileStore`] - one JSON document per id under a root directory

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use dlink_core::model::{DocumentId, ResolverDocument};
use std::fmt::Debug;

/// Opaque concurrency token; changes whenever a document's content changes
pub type Etag = String;

/// Key/value contract over stored resolver documents
///
/// # ETag semantics
///
/// ETags are opaque strings. `upsert_if_match(doc, None)` writes only when
/// no document exists (`If-None-Match: *`); `upsert_if_match(doc,
/// Some(etag))` writes only when the stored ETag still matches
/// (`If-Match`). Both fail with [`StoreError::PreconditionFailed`] on
/// conflict.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync {
    /// Read a document with its current ETag
    async fn get_with_etag(
        &self,
        id: &DocumentId,
    ) -> StoreResult<Option<(ResolverDocument, Etag)>>;

    /// Read a document
    async fn get(&self, id: &DocumentId) -> StoreResult<Option<ResolverDocument>> {
        Ok(self.get_with_etag(id).await?.map(|(doc, _)| doc))
    }

    /// Unconditional write (last writer wins)
    async fn upsert(&self, doc: &ResolverDocument) -> StoreResult<Etag>;

    /// Conditional write: `expected = None` requires the document to be
    /// absent; `expected = Some(etag)` requires the stored ETag to match.
    /// Returns the new ETag on success.
    async fn upsert_if_match(
        &self,
        doc: &ResolverDocument,
        expected: Option<&Etag>,
    ) -> StoreResult<Etag>;

    /// Delete by id. Returns `true` when a document existed.
    async fn delete(&self, id: &DocumentId) -> StoreResult<bool>;

    /// List every stored id.
    ///
    /// Scans all partitions; fine for the single-node deployments this
    /// workspace targets, expensive elsewhere.
    async fn list_ids(&self) -> StoreResult<Vec<DocumentId>>;
}
