//! Resolver pipeline
//!
//! Orchestrates a resolve request end to end: syntax validation, document
//! lookup (with serialized-identifier partial matching), qualifier
//! filtering, template substitution, linktype selection, content
//! negotiation, and response shaping.

mod query;

pub use query::QueryParams;

use crate::error::{Result, ServerError};
use crate::extract::ResolveHeaders;
use crate::state::AppState;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use dlink_core::model::{DataItem, DocumentId, LinksetEntry, ResolverDocument};
use dlink_core::negotiation::{self, Criteria};
use dlink_core::template::{self, Bindings};
use dlink_core::{linkset, linktype, matching, path, CoreError};
use serde_json::json;

/// Resolve an identifier with an optional qualifier tail.
pub async fn resolve(
    state: &AppState,
    identifier: &str,
    qualifier_path: Option<&str>,
    headers: &ResolveHeaders,
    params: &QueryParams,
) -> Result<Response> {
    let mut identifier = normalize_gtin(identifier);
    let qualifier_path = qualifier_path.unwrap_or("").to_string();

    // Compression branch: short-circuits the rest of the pipeline
    if params.compress_requested() {
        return compress_link(state, &identifier, &qualifier_path).await;
    }

    // Syntax check over the full path
    let full_path = format!("{identifier}{qualifier_path}");
    if !state.toolkit.test_syntax(&full_path).await? {
        return Err(CoreError::validation(format!("invalid GS1 Digital Link syntax: {full_path}")).into());
    }

    // Lookup, with partial matching for serialized identifiers
    let id = path_to_document_id(&identifier)?;
    let mut bindings = Bindings::new();
    let mut document = state.store.get(&id).await?;

    if document.is_none() {
        if let Some(found) = partial_match(state, &identifier).await? {
            if found.has_template {
                identifier = found.effective_identifier;
                bindings.extend(found.bindings);
            }
            document = Some(found.document);
        }
    }

    let document = document.ok_or_else(|| {
        ServerError::not_found(format!("no document for identifier {identifier}"))
    })?;

    // Qualifier filtering
    let filtered = filter_items(&document, &qualifier_path, &mut bindings)?;

    // Template substitution (non-fatal on failure)
    let filtered = template::substitute_variables(filtered, &bindings);

    let link_header = linkset::link_header(&state.config.fqdn, &identifier);

    // Linkset branch: explicit Accept, or a wildcard/linkset linktype
    let requested_linktype = params.get("linktype");
    let wants_linkset = headers.linkset_requested
        || requested_linktype
            .as_deref()
            .map(|lt| linktype::is_linkset_request(lt) || lt == "*")
            .unwrap_or(false);
    if wants_linkset {
        let body = linkset::format_linkset(&state.config.fqdn, &identifier, &filtered);
        let content_type = if headers.linkset_requested {
            "application/linkset+json"
        } else {
            "application/json"
        };
        return Ok((
            StatusCode::OK,
            [
                (header::LINK, link_header),
                (header::CONTENT_TYPE, content_type.to_string()),
            ],
            Json(body),
        )
            .into_response());
    }

    // Linktype selection
    let has_explicit_linktype = requested_linktype.is_some();
    let linktype_raw = requested_linktype
        .or_else(|| document.default_linktype.clone())
        .unwrap_or_else(|| "gs1:pip".to_string());
    let entries = select_entries(state, &filtered, &linktype_raw)?;

    // Content negotiation
    let criteria = Criteria {
        accept_languages: headers.accept_languages.clone(),
        context: params.get("context"),
        media_types: headers.media_types.clone(),
        has_explicit_linktype,
    };
    let negotiated = negotiation::negotiate(&entries, &criteria);

    shape_response(&negotiated, params, link_header)
}

/// Resolve a compressed leading segment: uncompress, rebuild the path,
/// then run the normal pipeline.
pub async fn resolve_compressed(
    state: &AppState,
    segment: &str,
    headers: &ResolveHeaders,
    params: &QueryParams,
) -> Result<Response> {
    let compressed = format!("/{segment}");
    let parts = state
        .toolkit
        .uncompress(&compressed)
        .await
        .map_err(|e| ServerError::bad_request(format!("decompression failed: {e}")))?;

    let primary = parts.identifiers.first().ok_or_else(|| {
        ServerError::bad_request(format!("compressed link {compressed} carried no identifier"))
    })?;
    let identifier = format!("/{}/{}", primary.ai, primary.value);
    let qualifier_path: String = parts
        .qualifiers
        .iter()
        .map(|q| format!("/{}/{}", q.ai, q.value))
        .collect();

    tracing::debug!(%identifier, %qualifier_path, "decompressed link");
    resolve(
        state,
        &identifier,
        Some(qualifier_path.as_str()).filter(|q| !q.is_empty()),
        headers,
        params,
    )
    .await
}

/// GTIN-13 → GTIN-14: a 13-digit `/01/` value gets a leading zero.
fn normalize_gtin(identifier: &str) -> String {
    if let Some(rest) = identifier.strip_prefix("/01/") {
        let value = rest.split('/').next().unwrap_or("");
        if value.len() == 13 && value.bytes().all(|b| b.is_ascii_digit()) {
            return format!("/01/0{rest}");
        }
    }
    identifier.to_string()
}

fn path_to_document_id(identifier: &str) -> Result<DocumentId> {
    Ok(path::path_to_id(identifier).map_err(CoreError::from)?)
}

/// Outcome of a serialized-identifier partial match
struct PartialMatch {
    document: ResolverDocument,
    effective_identifier: String,
    bindings: Bindings,
    has_template: bool,
}

/// For serialized identifiers (`8003`, `8004`, `00`), shorten the value one
/// character at a time and look for a stored prefix document. The stripped
/// suffix binds to `{0}` / `{1}` when the document's text carries those
/// tokens.
async fn partial_match(state: &AppState, identifier: &str) -> Result<Option<PartialMatch>> {
    let Some((ai, value)) = linkset::first_segment_pair(identifier) else {
        return Ok(None);
    };
    if !dlink_vocab::ai::SERIALIZED.contains(&ai) {
        return Ok(None);
    }

    let mut prefix = value;
    while let Some((last, _)) = prefix.char_indices().last() {
        prefix = &prefix[..last];
        if prefix.is_empty() {
            break;
        }

        let candidate = DocumentId::new(format!("{ai}_{prefix}"));
        if let Some(document) = state.store.get(&candidate).await? {
            let suffix = &value[prefix.len()..];
            let mut bindings = Bindings::new();
            let mut has_template = false;
            for token in ["0", "1"] {
                if template::data_contains_token(&document.data, &format!("{{{token}}}")) {
                    bindings.insert(token.to_string(), suffix.to_string());
                    has_template = true;
                }
            }

            tracing::debug!(ai, prefix, suffix, has_template, "serialized partial match");
            return Ok(Some(PartialMatch {
                document,
                effective_identifier: format!("/{ai}/{prefix}"),
                bindings,
                has_template,
            }));
        }
    }

    Ok(None)
}

/// Keep the data items matching the request qualifiers, collecting
/// template bindings from each match.
fn filter_items(
    document: &ResolverDocument,
    qualifier_path: &str,
    bindings: &mut Bindings,
) -> Result<Vec<DataItem>> {
    if qualifier_path.split('/').any(|s| !s.is_empty()) {
        let request_qualifiers = path::parse_qualifier_path(qualifier_path);
        let mut filtered = Vec::new();
        for item in &document.data {
            // Unqualified items never match a qualified request
            if item.qualifiers.is_empty() {
                continue;
            }
            if let Some(found) = matching::match_qualifiers(&request_qualifiers, &item.qualifiers)
            {
                bindings.extend(found);
                filtered.push(item.clone());
            }
        }
        if filtered.is_empty() {
            return Err(ServerError::not_found(format!(
                "no matching qualifiers for {qualifier_path}"
            )));
        }
        Ok(filtered)
    } else {
        let filtered: Vec<DataItem> = document
            .data
            .iter()
            .filter(|item| item.qualifiers.is_empty())
            .cloned()
            .collect();
        if filtered.is_empty() {
            return Err(ServerError::not_found(
                "document has no unqualified data items",
            ));
        }
        Ok(filtered)
    }
}

/// Collect entries for the requested linktype. The first pass matches the
/// normalized IRI exactly; when that comes up empty and the fallback is
/// enabled, a second pass retries with the unnormalized value allowing
/// substring and `/term` suffix matches.
fn select_entries(
    state: &AppState,
    items: &[DataItem],
    linktype_raw: &str,
) -> Result<Vec<LinksetEntry>> {
    let normalized = linktype::normalize_linktype(linktype_raw);
    let mut entries = collect_entries(items, |key| key.eq_ignore_ascii_case(&normalized));

    if entries.is_empty() && state.config.linktype_fallback {
        let raw_lower = linktype_raw.to_ascii_lowercase();
        let suffix = format!("/{raw_lower}");
        entries = collect_entries(items, |key| {
            let key = key.to_ascii_lowercase();
            key == raw_lower || key.contains(&raw_lower) || key.ends_with(&suffix)
        });
    }

    if entries.is_empty() {
        return Err(ServerError::not_found(format!(
            "no entries for linktype {linktype_raw}"
        )));
    }
    Ok(entries)
}

fn collect_entries(items: &[DataItem], matches: impl Fn(&str) -> bool) -> Vec<LinksetEntry> {
    let mut entries = Vec::new();
    for item in items {
        for (key, list) in &item.linkset.link_types {
            if matches(key) {
                entries.extend(list.iter().cloned());
            }
        }
    }
    entries
}

/// Shape the negotiated entries into a 307, 300, or 404.
fn shape_response(
    negotiated: &[LinksetEntry],
    params: &QueryParams,
    link_header: String,
) -> Result<Response> {
    match negotiated {
        [] => Err(ServerError::not_found(
            "content negotiation left no entries",
        )),
        [only] => {
            let location = params.append_preserved(&only.href);
            Ok((
                StatusCode::TEMPORARY_REDIRECT,
                [
                    (header::LOCATION, location),
                    (header::LINK, link_header),
                ],
            )
                .into_response())
        }
        many => {
            let body = linkset::multiple_choices_body(many);
            Ok((
                StatusCode::MULTIPLE_CHOICES,
                [(header::LINK, link_header)],
                Json(body),
            )
                .into_response())
        }
    }
}

/// `?compress=true`: hand the full path to the toolkit and return the
/// compressed form. Toolkit failures on this path are client errors.
async fn compress_link(
    state: &AppState,
    identifier: &str,
    qualifier_path: &str,
) -> Result<Response> {
    let link = format!("{identifier}{qualifier_path}");
    match state.toolkit.compress(&link).await {
        Ok(compressed) => Ok(Json(json!({ "compressedLink": compressed })).into_response()),
        Err(e) => Err(ServerError::bad_request(format!("compression failed: {e}"))),
    }
}
