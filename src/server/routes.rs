//! Router configuration for the HTTP API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the router with all routes.
///
/// Only the search routes are rate limited.
pub fn create_router(state: AppState) -> Router {
    let search = Router::new()
        .route("/api/library", get(handlers::library))
        .route("/api/library/refresh", post(handlers::refresh))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/library/stats", get(handlers::stats))
        .route("/api/report-broken", post(handlers::report_broken))
        .merge(search)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
