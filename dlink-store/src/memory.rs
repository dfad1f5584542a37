//! In-memory store backend
//!
//! Stores documents in a `HashMap` behind `Arc<RwLock>`, making it
//! thread-safe and suitable for multi-threaded async runtimes. ETags are a
//! per-store monotonic counter stamped on every write.

use crate::{DocumentStore, Etag, StoreError, StoreResult};
use async_trait::async_trait;
use dlink_core::model::{DocumentId, ResolverDocument};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// In-memory document store for tests and ephemeral deployments
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, (ResolverDocument, u64)>,
    next_version: u64,
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MemoryStore")
            .field("document_count", &inner.documents.len())
            .finish()
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.inner.read().documents.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().documents.is_empty()
    }
}

impl Inner {
    fn stamp(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_with_etag(
        &self,
        id: &DocumentId,
    ) -> StoreResult<Option<(ResolverDocument, Etag)>> {
        let inner = self.inner.read();
        Ok(inner
            .documents
            .get(id.as_str())
            .map(|(doc, version)| (doc.clone(), version.to_string())))
    }

    async fn upsert(&self, doc: &ResolverDocument) -> StoreResult<Etag> {
        let mut inner = self.inner.write();
        let version = inner.stamp();
        inner
            .documents
            .insert(doc.id.as_str().to_string(), (doc.clone(), version));
        Ok(version.to_string())
    }

    async fn upsert_if_match(
        &self,
        doc: &ResolverDocument,
        expected: Option<&Etag>,
    ) -> StoreResult<Etag> {
        let mut inner = self.inner.write();
        let current = inner.documents.get(doc.id.as_str()).map(|(_, v)| *v);

        match (expected, current) {
            (None, Some(_)) => return Err(StoreError::PreconditionFailed),
            (Some(_), None) => {
                return Err(StoreError::not_found(format!(
                    "document {} no longer exists",
                    doc.id
                )))
            }
            (Some(etag), Some(version)) if etag != &version.to_string() => {
                return Err(StoreError::PreconditionFailed)
            }
            _ => {}
        }

        let version = inner.stamp();
        inner
            .documents
            .insert(doc.id.as_str().to_string(), (doc.clone(), version));
        Ok(version.to_string())
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        Ok(inner.documents.remove(id.as_str()).is_some())
    }

    async fn list_ids(&self) -> StoreResult<Vec<DocumentId>> {
        let inner = self.inner.read();
        let mut ids: Vec<String> = inner.documents.keys().cloned().collect();
        ids.sort();
        Ok(ids.into_iter().map(DocumentId::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> ResolverDocument {
        ResolverDocument {
            id: DocumentId::new(id),
            default_linktype: None,
            data: vec![],
        }
    }

    #[tokio::test]
    async fn get_and_upsert_roundtrip() {
        let store = MemoryStore::new();
        let id = DocumentId::new("01_1");
        assert!(store.get(&id).await.unwrap().is_none());

        store.upsert(&doc("01_1")).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_if_absent_conflicts_on_existing() {
        let store = MemoryStore::new();
        store.upsert_if_match(&doc("01_1"), None).await.unwrap();
        let err = store.upsert_if_match(&doc("01_1"), None).await.unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed));
    }

    #[tokio::test]
    async fn etag_mismatch_conflicts() {
        let store = MemoryStore::new();
        let etag = store.upsert(&doc("01_1")).await.unwrap();
        store.upsert(&doc("01_1")).await.unwrap();

        let err = store
            .upsert_if_match(&doc("01_1"), Some(&etag))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed));
    }

    #[tokio::test]
    async fn etag_match_succeeds_and_advances() {
        let store = MemoryStore::new();
        let etag = store.upsert(&doc("01_1")).await.unwrap();
        let next = store
            .upsert_if_match(&doc("01_1"), Some(&etag))
            .await
            .unwrap();
        assert_ne!(etag, next);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = MemoryStore::new();
        let id = DocumentId::new("01_1");
        assert!(!store.delete(&id).await.unwrap());
        store.upsert(&doc("01_1")).await.unwrap();
        assert!(store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_ids_sorted() {
        let store = MemoryStore::new();
        store.upsert(&doc("8004_2")).await.unwrap();
        store.upsert(&doc("01_1")).await.unwrap();
        let ids = store.list_ids().await.unwrap();
        let raw: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(raw, vec!["01_1", "8004_2"]);
    }
}
