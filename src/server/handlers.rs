//! API endpoint handlers.

use super::types::{
    HealthResponse, LibraryParams, LibraryResponse, RefreshResponse, ReportResponse,
    StatsResponse,
};
use super::AppState;
use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{debug, error, info, warn};

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Search endpoint
pub async fn library(
    State(state): State<AppState>,
    Query(params): Query<LibraryParams>,
) -> Response {
    let started = Instant::now();

    let request = match params.to_request() {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejected search parameters: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(LibraryResponse::error("bad_request", e, 0)),
            )
                .into_response();
        }
    };

    match state.coordinator.search(&request).await {
        Ok(outcome) => Json(LibraryResponse::from_outcome(outcome, elapsed_ms(started)))
            .into_response(),
        Err(e) => {
            let took = elapsed_ms(started);
            error!("LIB fail took={}ms err={}", took, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(LibraryResponse::error("LIB_ERROR", e.to_string(), took)),
            )
                .into_response()
        }
    }
}

/// Starts a background search that bypasses the cache
pub async fn refresh(
    State(state): State<AppState>,
    Query(params): Query<LibraryParams>,
) -> Response {
    let request = match params.to_request() {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(LibraryResponse::error("bad_request", e, 0)),
            )
                .into_response()
        }
    };

    let coordinator = state.coordinator.clone();
    tokio::spawn(async move {
        match coordinator.refresh(&request).await {
            Ok(outcome) => info!("Refresh stored {} items", outcome.items.len()),
            Err(e) => error!("Refresh failed: {}", e),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            status: "refresh_started",
        }),
    )
        .into_response()
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: state.service_name.to_string(),
    })
}

pub async fn report_broken(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Json<ReportResponse> {
    let count = state.reports.add(&payload);
    Json(ReportResponse {
        ok: true,
        stored: true,
        count,
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache_entries: state.coordinator.cache().len(),
        reports: state.reports.len(),
    })
}

/// Client identifier: the peer IP when known
fn client_id(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware for the search routes
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_id(&request);
    let Some(retry_after) = state.limiter.check(&client).retry_after_secs() else {
        return next.run(request).await;
    };

    warn!("Rate limited {} (retry after {}s)", client, retry_after);
    let hint = format!(
        "Too many requests from {}. Limit {}/{}s",
        client,
        state.limiter.max_requests(),
        state.limiter.window().as_secs()
    );
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_after.to_string())],
        Json(LibraryResponse::error("rate_limited", hint, 0)),
    )
        .into_response()
}
