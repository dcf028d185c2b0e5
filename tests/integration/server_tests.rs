//! Integration tests for the HTTP API
//!
//! Requests go straight into the axum router with `tower::ServiceExt::oneshot`;
//! target sites are wiremock servers reached through the HTTP page engine.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use elmafdein_library::browser::{BrowserLauncher, BrowserSession};
use elmafdein_library::config::{BrowserEngine, Config};
use elmafdein_library::server::{create_router, AppState};
use elmafdein_library::{Coordinator, LibraryError};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(site_uri: &str) -> Config {
    let mut config = Config::default();
    config.browser.engine = BrowserEngine::Http;
    config.scraper.respect_robots = false;
    config.scraper.delay_min_ms = 0;
    config.scraper.delay_max_ms = 0;
    config.scraper.retry_attempts = 1;
    config.sites.coptic.base_url = site_uri.to_string();
    config.sites.christianlib.base_url = site_uri.to_string();
    config
}

fn create_app(config: Config) -> Router {
    let coordinator = Coordinator::new(config).unwrap();
    create_router(AppState::new(coordinator))
}

fn get(uri: &str, client: [u8; 4]) -> Request<Body> {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((client, 40000))));
    request
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = create_app(create_test_config("http://127.0.0.1:9"));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"ok": true, "service": "Elmafdein Library API"})
    );
}

#[tokio::test]
async fn test_report_broken_counts_reports() {
    let app = create_app(create_test_config("http://127.0.0.1:9"));

    for expected in 1..=2 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/report-broken")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"url": "https://coptic-treasures.com/x.pdf", "status": 404}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"ok": true, "stored": true, "count": expected})
        );
    }

    let response = app
        .oneshot(get("/api/library/stats", [127, 0, 0, 1]))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["reports"], 2);
}

#[tokio::test]
async fn test_unknown_site_is_bad_request() {
    let app = create_app(create_test_config("http://127.0.0.1:9"));

    let response = app
        .oneshot(get("/api/library?q=liturgy&site=nowhere", [127, 0, 0, 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["count"], 0);
    assert_eq!(body["cached"], false);
}

#[tokio::test]
async fn test_out_of_range_pages_is_bad_request() {
    let app = create_app(create_test_config("http://127.0.0.1:9"));

    for uri in [
        "/api/library?max_pages=0",
        "/api/library?max_pages=6",
        "/api/library?max_follow=11",
        "/api/library?max_pages=many",
    ] {
        let response = app.clone().oneshot(get(uri, [127, 0, 0, 1])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_rate_limit_rejects_overflow_request() {
    let mut config = create_test_config("http://127.0.0.1:9");
    config.rate_limit.max_requests = 3;
    config.rate_limit.window_secs = 120;
    let app = create_app(config);

    // Rejected parameters still count against the window
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get("/api/library?site=nowhere", [10, 0, 0, 1]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .clone()
        .oneshot(get("/api/library?site=nowhere", [10, 0, 0, 1]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 120);

    let body = json_body(response).await;
    assert_eq!(body["error"], "rate_limited");
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["count"], 0);

    // Another client has its own window
    let response = app
        .clone()
        .oneshot(get("/api/library?site=nowhere", [10, 0, 0, 2]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unlimited routes are unaffected
    let response = app.oneshot(get("/health", [10, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_library_search_and_cache_flag() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sections/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<article><h2><a href="/files/agpeya.pdf">The Agpeya</a></h2>
               <p>Arabic edition, 1998, 120 pages</p></article>"#,
        ))
        .expect(1)
        .mount(&site)
        .await;

    let app = create_app(create_test_config(&site.uri()));
    let uri = "/api/library?site=coptic&max_pages=1";

    let response = app.clone().oneshot(get(uri, [127, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["cached"], false);
    assert!(body.get("hint").is_none());

    let item = &body["items"][0];
    assert_eq!(item["title"], "The Agpeya");
    assert_eq!(item["source"], "coptic");
    assert_eq!(item["download_url"], format!("{}/files/agpeya.pdf", site.uri()));
    assert_eq!(item["year"], 1998);
    assert_eq!(item["pages"], 120);

    let response = app.oneshot(get(uri, [127, 0, 0, 1])).await.unwrap();
    assert_eq!(json_body(response).await["cached"], true);
}

#[tokio::test]
async fn test_empty_search_returns_hint() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sections/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Nothing here</p>"))
        .mount(&site)
        .await;

    let app = create_app(create_test_config(&site.uri()));

    let response = app
        .oneshot(get("/api/library?q=liturgy&site=coptic", [127, 0, 0, 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["cached"], false);
    assert_eq!(body["hint"], r#"no matches; tried=["listing:coptic"]"#);
}

/// A browser that never starts
struct BrokenLauncher;

#[async_trait]
impl BrowserLauncher for BrokenLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, LibraryError> {
        Err(LibraryError::Browser("Chrome executable not found".to_string()))
    }
}

#[tokio::test]
async fn test_browser_failure_is_bad_gateway() {
    let config = create_test_config("http://127.0.0.1:9");
    let coordinator = Coordinator::with_launcher(config, Arc::new(BrokenLauncher)).unwrap();
    let app = create_router(AppState::new(coordinator));

    let response = app
        .oneshot(get("/api/library?q=liturgy", [127, 0, 0, 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "LIB_ERROR");
    assert!(body["hint"].as_str().unwrap().contains("Chrome executable not found"));
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["count"], 0);
    assert_eq!(body["cached"], false);
    assert!(body["took_ms"].is_u64());
}

#[tokio::test]
async fn test_refresh_is_accepted() {
    let app = create_app(create_test_config("http://127.0.0.1:9"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/library/refresh?site=coptic")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await, json!({"status": "refresh_started"}));
}
