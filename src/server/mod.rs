//! HTTP API for library searches.
//!
//! Routes:
//! - `GET /api/library` search, rate limited per client; a cache hit reports
//!   `cached: true` and the trail marker `cache`
//! - `POST /api/library/refresh` background search that bypasses the cache
//! - `GET /api/library/stats` cache and report counts
//! - `POST /api/report-broken` broken-link reports, kept in memory
//! - `GET /health`

mod handlers;
mod rate_limit;
mod reports;
mod routes;
mod types;

pub use rate_limit::{RateDecision, RateLimiter};
pub use reports::{Report, ReportStore, MAX_FIELD_CHARS};
pub use routes::create_router;
pub use types::{LibraryParams, LibraryResponse};

use crate::crawler::Coordinator;
use crate::LibraryError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub limiter: Arc<RateLimiter>,
    pub reports: Arc<ReportStore>,
    pub service_name: Arc<str>,
}

impl AppState {
    /// Builds the state from the coordinator's configuration
    pub fn new(coordinator: Coordinator) -> Self {
        let config = coordinator.config();
        let limiter = RateLimiter::from_config(&config.rate_limit);
        let reports = ReportStore::new(config.server.report_capacity);
        let service_name: Arc<str> = Arc::from(config.server.service_name.as_str());

        Self {
            coordinator: Arc::new(coordinator),
            limiter: Arc::new(limiter),
            reports: Arc::new(reports),
            service_name,
        }
    }
}

/// Start the web server.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<(), LibraryError> {
    let limiter = state.limiter.clone();
    let app = create_router(state);

    let listener = TcpListener::bind((host, port)).await?;
    info!("Serving library API at http://{}", listener.local_addr()?);
    if limiter.is_enabled() {
        info!(
            "Rate limit: {} requests per {}s per client",
            limiter.max_requests(),
            limiter.window().as_secs()
        );
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
