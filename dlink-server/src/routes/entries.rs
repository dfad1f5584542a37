//! Data-Entry write-path handlers
//!
//! Authoring, merge-upsert, read, index, delete, and v2 migration. Batch
//! submissions report per-entry results; the overall status is 201 unless
//! every entry failed.

use crate::error::{Result, ServerError};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dlink_core::authoring;
use dlink_core::merge::{self, MergeOutcome};
use dlink_core::migrate::{migrate_v2, V2Entry};
use dlink_core::model::{Entry, ResolverDocument};
use dlink_core::{id_to_path, path_to_id, CoreError};
use dlink_store::StoreError;
use serde::Serialize;
use std::sync::Arc;

/// Bounded optimistic-concurrency retries before surfacing a conflict
const UPSERT_RETRIES: usize = 3;

/// Per-entry outcome reported in batch responses
#[derive(Debug, Serialize)]
pub struct EntryResult {
    /// Document id (or the submitted anchor when authoring failed)
    pub id: String,
    /// Per-entry HTTP-style status
    pub status: u16,
    /// Human-readable outcome
    pub message: String,
}

/// POST /api/new - batch entry submission
pub async fn create_entries(
    State(state): State<Arc<AppState>>,
    Json(entries): Json<Vec<Entry>>,
) -> Result<Response> {
    if entries.is_empty() {
        return Err(ServerError::bad_request("no entries submitted"));
    }
    let results = author_and_upsert(&state, &entries).await;
    Ok(batch_response(results, StatusCode::CREATED))
}

/// POST /api/new/single - single entry submission
pub async fn create_single(
    State(state): State<Arc<AppState>>,
    Json(entry): Json<Entry>,
) -> Result<Response> {
    let results = author_and_upsert(&state, std::slice::from_ref(&entry)).await;
    Ok(batch_response(results, StatusCode::CREATED))
}

/// PUT /api/{ai}/{value} - update entries under a known anchor
///
/// Every submitted anchor must start with `/{ai}/{value}`; qualifier tails
/// are allowed.
pub async fn put_entries(
    State(state): State<Arc<AppState>>,
    Path((ai, value)): Path<(String, String)>,
    Json(entries): Json<Vec<Entry>>,
) -> Result<Response> {
    if entries.is_empty() {
        return Err(ServerError::bad_request("no entries submitted"));
    }

    let prefix = format!("/{ai}/{value}");
    for entry in &entries {
        let anchor = entry.anchor.trim_end_matches('/');
        if anchor != prefix && !anchor.starts_with(&format!("{prefix}/")) {
            return Err(ServerError::bad_request(format!(
                "anchor {} does not start with {prefix}",
                entry.anchor
            )));
        }
    }

    let results = author_and_upsert(&state, &entries).await;
    Ok(batch_response(results, StatusCode::OK))
}

/// GET /api/{ai}/{value} - read a stored document
pub async fn read_document(
    State(state): State<Arc<AppState>>,
    Path((ai, value)): Path<(String, String)>,
) -> Result<Json<ResolverDocument>> {
    read_by_anchor(&state, &format!("/{ai}/{value}")).await
}

/// GET /api/{ai}/{value}/{qualifiers...} - read a qualified-anchor document
pub async fn read_document_qualified(
    State(state): State<Arc<AppState>>,
    Path((ai, value, qualifiers)): Path<(String, String, String)>,
) -> Result<Json<ResolverDocument>> {
    read_by_anchor(&state, &format!("/{ai}/{value}/{qualifiers}")).await
}

/// GET /api/index - every stored anchor as a path string
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    let ids = state.store.list_ids().await?;
    Ok(Json(ids.iter().map(id_to_path).collect()))
}

/// Delete response body
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Deleted document id
    pub id: String,
    /// Outcome
    pub status: String,
}

/// DELETE /api/{ai}/{value} - delete by anchor
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path((ai, value)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    delete_by_anchor(&state, &format!("/{ai}/{value}")).await
}

/// DELETE /api/{ai}/{value}/{qualifiers...} - delete a qualified anchor
pub async fn delete_document_qualified(
    State(state): State<Arc<AppState>>,
    Path((ai, value, qualifiers)): Path<(String, String, String)>,
) -> Result<Json<DeleteResponse>> {
    delete_by_anchor(&state, &format!("/{ai}/{value}/{qualifiers}")).await
}

/// POST /api/migrate-v2 - convert legacy entries (no persistence)
pub async fn migrate(Json(entries): Json<Vec<V2Entry>>) -> Json<Vec<Entry>> {
    Json(migrate_v2(&entries))
}

async fn read_by_anchor(state: &AppState, anchor: &str) -> Result<Json<ResolverDocument>> {
    let id = path_to_id(anchor).map_err(CoreError::from)?;
    let document = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ServerError::not_found(format!("no document for {anchor}")))?;
    Ok(Json(document))
}

async fn delete_by_anchor(state: &AppState, anchor: &str) -> Result<Json<DeleteResponse>> {
    let id = path_to_id(anchor).map_err(CoreError::from)?;
    if !state.store.delete(&id).await? {
        return Err(ServerError::not_found(format!("no document for {anchor}")));
    }
    tracing::info!(id = %id, "document deleted");
    Ok(Json(DeleteResponse {
        id: id.into_inner(),
        status: "deleted".to_string(),
    }))
}

/// Author every entry, group by anchor, and merge-upsert each document.
/// Authoring failures are reported per entry; upserts per document.
async fn author_and_upsert(state: &AppState, entries: &[Entry]) -> Vec<EntryResult> {
    let mut results = Vec::new();
    let mut authored = Vec::new();

    for entry in entries {
        match authoring::author_entry(entry) {
            Ok(doc) => authored.push(doc),
            Err(e) => results.push(EntryResult {
                id: entry.anchor.clone(),
                status: StatusCode::BAD_REQUEST.as_u16(),
                message: e.to_string(),
            }),
        }
    }

    for document in authoring::group_documents(authored) {
        let id = document.id.as_str().to_string();
        match upsert_with_retry(state, document).await {
            Ok(created) => results.push(EntryResult {
                id,
                status: if created {
                    StatusCode::CREATED.as_u16()
                } else {
                    StatusCode::OK.as_u16()
                },
                message: if created { "created" } else { "updated" }.to_string(),
            }),
            Err(e) => results.push(EntryResult {
                id,
                status: e.status_code().as_u16(),
                message: e.to_string(),
            }),
        }
    }

    results
}

/// Merge-upsert one document with a bounded optimistic-concurrency loop.
/// Returns whether the document was newly created.
async fn upsert_with_retry(state: &AppState, document: ResolverDocument) -> Result<bool> {
    for _attempt in 0..UPSERT_RETRIES {
        let existing = state.store.get_with_etag(&document.id).await?;
        let (existing_doc, etag) = match existing {
            Some((doc, etag)) => (Some(doc), Some(etag)),
            None => (None, None),
        };

        let MergeOutcome { document: merged, created } =
            merge::merge_documents(document.clone(), existing_doc);

        match state
            .store
            .upsert_if_match(&merged, etag.as_ref())
            .await
        {
            Ok(_) => {
                tracing::info!(id = %merged.id, created, "document upserted");
                return Ok(created);
            }
            // Lost the race; re-read and merge again
            Err(StoreError::PreconditionFailed) | Err(StoreError::NotFound(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServerError::conflict(format!(
        "document {} kept changing; gave up after {UPSERT_RETRIES} attempts",
        document.id
    )))
}

/// Batch responses are `success_status` unless every entry failed.
fn batch_response(results: Vec<EntryResult>, success_status: StatusCode) -> Response {
    let all_failed = !results.is_empty()
        && results
            .iter()
            .all(|r| r.status >= StatusCode::BAD_REQUEST.as_u16());
    let status = if all_failed {
        StatusCode::BAD_REQUEST
    } else {
        success_status
    };
    (status, Json(results)).into_response()
}
