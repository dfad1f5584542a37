//! Bearer-token authentication for the Data-Entry API

use crate::error::ServerError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, AUTHORIZATION};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Middleware guarding every `/api` route.
///
/// Accepts any token from the configured set. With `--api-auth-disabled`
/// the check is skipped entirely.
pub async fn require_api_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.config.api_auth_disabled {
        return next.run(request).await;
    }

    match bearer_token(request.headers()) {
        Some(token) if state.config.is_api_token_valid(&token) => next.run(request).await,
        Some(_) => {
            tracing::warn!("rejected Data-Entry request with invalid token");
            ServerError::unauthorized("invalid bearer token").into_response()
        }
        None => ServerError::unauthorized("Bearer token required").into_response(),
    }
}

/// Pull the token out of an `Authorization` header. The scheme compares
/// case-insensitively and surrounding whitespace is ignored; anything
/// other than a non-empty `Bearer` credential yields `None`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credential) = value.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let credential = credential.trim();
    if credential.is_empty() {
        return None;
    }
    Some(credential.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn token_from(value: &str) -> Option<String> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        bearer_token(&headers)
    }

    #[test]
    fn standard_scheme() {
        assert_eq!(token_from("Bearer secret-token"), Some("secret-token".to_string()));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        for value in ["bearer secret", "BEARER secret", "Bearer secret"] {
            assert_eq!(token_from(value), Some("secret".to_string()));
        }
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(token_from("  Bearer   secret  "), Some("secret".to_string()));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_eq!(token_from("Basic dXNlcg=="), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn empty_credential_is_rejected() {
        assert_eq!(token_from("Bearer"), None);
        assert_eq!(token_from("Bearer   "), None);
    }
}
