//! Public read-path handlers
//!
//! Thin wrappers that parse the path shape and hand off to the resolver
//! pipeline in [`crate::resolve`].

use crate::error::{Result, ServerError};
use crate::extract::ResolveHeaders;
use crate::resolve::{self, QueryParams};
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /{ai}/{value}
pub async fn resolve_identifier(
    State(state): State<Arc<AppState>>,
    Path((ai, value)): Path<(String, String)>,
    headers: ResolveHeaders,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let identifier = format!("/{ai}/{value}");
    let params = QueryParams::parse(query.as_deref().unwrap_or(""));
    tracing::debug!(%identifier, "resolving identifier");
    resolve::resolve(&state, &identifier, None, &headers, &params).await
}

/// GET /{ai}/{value}/{qualifiers...}
pub async fn resolve_qualified(
    State(state): State<Arc<AppState>>,
    Path((ai, value, qualifiers)): Path<(String, String, String)>,
    headers: ResolveHeaders,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let identifier = format!("/{ai}/{value}");
    let qualifier_path = format!("/{qualifiers}");
    let params = QueryParams::parse(query.as_deref().unwrap_or(""));
    tracing::debug!(%identifier, %qualifier_path, "resolving qualified identifier");
    resolve::resolve(&state, &identifier, Some(&qualifier_path), &headers, &params).await
}

/// GET /{segment} - a single leading segment that is not an AI is treated
/// as a compressed Digital Link.
pub async fn resolve_segment(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
    headers: ResolveHeaders,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    if looks_like_ai(&segment) {
        return Err(ServerError::bad_request(format!(
            "identifier /{segment} is missing a value"
        )));
    }
    let params = QueryParams::parse(query.as_deref().unwrap_or(""));
    resolve::resolve_compressed(&state, &segment, &headers, &params).await
}

/// GET /.well-known/gs1resolver
pub async fn well_known(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "resolverRoot": format!("https://{}/", state.config.fqdn),
        "supportedPrimaryKeys": ["all"],
        "active": true,
    }))
}

/// OPTIONS handler shared by the resolver routes
pub async fn options_ok() -> Response {
    (
        StatusCode::NO_CONTENT,
        [(header::ALLOW, "GET, HEAD, OPTIONS")],
    )
        .into_response()
}

/// An AI is a 2-4 digit numeric code
fn looks_like_ai(segment: &str) -> bool {
    (2..=4).contains(&segment.len()) && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_detection() {
        assert!(looks_like_ai("01"));
        assert!(looks_like_ai("8004"));
        assert!(!looks_like_ai("1"));
        assert!(!looks_like_ai("12345"));
        assert!(!looks_like_ai("ARFKk4XB0CDKWcnpq"));
    }
}
