//! HTTP route handlers and router configuration

mod admin;
mod auth;
mod entries;
mod resolver;

use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the main application router
pub fn build_router(state: Arc<AppState>) -> Router {
    // Data-Entry API - bearer-token protected
    let api_routes = Router::new()
        .route("/new", post(entries::create_entries))
        .route("/new/single", post(entries::create_single))
        .route("/index", get(entries::index))
        .route("/migrate-v2", post(entries::migrate))
        .route(
            "/:ai/:value",
            get(entries::read_document)
                .put(entries::put_entries)
                .delete(entries::delete_document),
        )
        .route(
            "/:ai/:value/*qualifiers",
            get(entries::read_document_qualified).delete(entries::delete_document_qualified),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_token,
        ));

    let router = Router::new()
        // Liveness
        .route("/health", get(admin::health))
        // Resolver description document
        .route("/.well-known/gs1resolver", get(resolver::well_known))
        // Data-Entry API
        .nest("/api", api_routes)
        // Read path: compressed links, identifiers, qualified identifiers
        .route(
            "/:segment",
            get(resolver::resolve_segment).options(resolver::options_ok),
        )
        .route(
            "/:ai/:value",
            get(resolver::resolve_identifier).options(resolver::options_ok),
        )
        .route(
            "/:ai/:value/*qualifiers",
            get(resolver::resolve_qualified).options(resolver::options_ok),
        )
        .with_state(state.clone());

    let router = router.layer(TraceLayer::new_for_http());

    if state.config.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
