//! Resolver-specific HTTP header extraction
//!
//! Parses `Accept` and `Accept-Language` into ordered lists for content
//! negotiation. Quality suffixes are kept here; the negotiation engine
//! strips them.

use axum::extract::FromRequestParts;
use axum::http::header::{HeaderMap, ACCEPT, ACCEPT_LANGUAGE};
use axum::http::request::Parts;
use dlink_core::negotiation;
use std::convert::Infallible;

/// Media type that switches the pipeline into its linkset branch
pub const LINKSET_MEDIA_TYPE: &str = "application/linkset+json";

/// Negotiation-relevant headers of a resolve request
#[derive(Debug, Clone)]
pub struct ResolveHeaders {
    /// `Accept-Language` tags in header order; `["und"]` when absent
    pub accept_languages: Vec<String>,

    /// `Accept` media types in header order
    pub media_types: Vec<String>,

    /// Whether the client asked for `application/linkset+json`
    pub linkset_requested: bool,
}

impl Default for ResolveHeaders {
    fn default() -> Self {
        Self {
            accept_languages: vec![negotiation::UNDEFINED_LANG.to_string()],
            media_types: Vec::new(),
            linkset_requested: false,
        }
    }
}

impl ResolveHeaders {
    /// Parse headers from a HeaderMap
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let accept_languages = header_list(headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()));
        let media_types = header_list(headers.get(ACCEPT).and_then(|v| v.to_str().ok()));

        let linkset_requested = negotiation::clean_header_list(&media_types)
            .iter()
            .any(|m| m.eq_ignore_ascii_case(LINKSET_MEDIA_TYPE));

        Self {
            accept_languages: if accept_languages.is_empty() {
                vec![negotiation::UNDEFINED_LANG.to_string()]
            } else {
                accept_languages
            },
            media_types,
            linkset_requested,
        }
    }
}

fn header_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ResolveHeaders
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(ResolveHeaders::from_headers(&parts.headers))
    }
}
