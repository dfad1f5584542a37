//! File-backed store backend
//!
//! One JSON document per id under a root directory. Writes go through a
//! temp-file-plus-rename so readers never observe a torn document, and a
//! store-wide mutex serializes the conditional read-compare-write path.
//! ETags are a hash of the stored bytes.

use crate::{DocumentStore, Etag, StoreError, StoreResult};
use async_trait::async_trait;
use dlink_core::model::{DocumentId, ResolverDocument};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed document store
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| StoreError::io(format!("creating store root {}: {e}", root.display())))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory documents live under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &DocumentId) -> PathBuf {
        self.root.join(format!("{}.json", id.as_str()))
    }

    async fn read_bytes(&self, id: &DocumentId) -> StoreResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::unavailable(format!("reading {}: {e}", id))),
        }
    }

    async fn write_bytes(&self, id: &DocumentId, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::unavailable(format!("writing {}: {e}", id)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::unavailable(format!("renaming {}: {e}", id)))
    }
}

fn etag_of(bytes: &[u8]) -> Etag {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn encode(doc: &ResolverDocument) -> StoreResult<Vec<u8>> {
    serde_json::to_vec_pretty(doc).map_err(|e| StoreError::corrupt(e.to_string()))
}

fn decode(id: &DocumentId, bytes: &[u8]) -> StoreResult<ResolverDocument> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::error!(id = %id, error = %e, "stored document failed to decode");
        StoreError::corrupt(format!("document {}: {e}", id))
    })
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get_with_etag(
        &self,
        id: &DocumentId,
    ) -> StoreResult<Option<(ResolverDocument, Etag)>> {
        match self.read_bytes(id).await? {
            Some(bytes) => {
                let doc = decode(id, &bytes)?;
                Ok(Some((doc, etag_of(&bytes))))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, doc: &ResolverDocument) -> StoreResult<Etag> {
        let bytes = encode(doc)?;
        let _guard = self.write_lock.lock().await;
        self.write_bytes(&doc.id, &bytes).await?;
        Ok(etag_of(&bytes))
    }

    async fn upsert_if_match(
        &self,
        doc: &ResolverDocument,
        expected: Option<&Etag>,
    ) -> StoreResult<Etag> {
        let bytes = encode(doc)?;
        let _guard = self.write_lock.lock().await;

        let current = self.read_bytes(&doc.id).await?.map(|b| etag_of(&b));
        match (expected, current) {
            (None, Some(_)) => return Err(StoreError::PreconditionFailed),
            (Some(_), None) => {
                return Err(StoreError::not_found(format!(
                    "document {} no longer exists",
                    doc.id
                )))
            }
            (Some(etag), Some(ref stored)) if etag != stored => {
                return Err(StoreError::PreconditionFailed)
            }
            _ => {}
        }

        self.write_bytes(&doc.id, &bytes).await?;
        Ok(etag_of(&bytes))
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::unavailable(format!("deleting {}: {e}", id))),
        }
    }

    async fn list_ids(&self) -> StoreResult<Vec<DocumentId>> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::unavailable(format!("listing store root: {e}")))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::unavailable(format!("listing store root: {e}")))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(id) = name.strip_suffix(".json") {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids.into_iter().map(DocumentId::new).collect())
    }
}
