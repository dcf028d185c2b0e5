//! Integration tests for library searches
//!
//! These tests use wiremock servers standing in for both target sites and
//! drive full searches through the plain HTTP page engine.

use elmafdein_library::config::{BrowserEngine, Config};
use elmafdein_library::{Coordinator, SearchRequest, SiteScope, Source};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast, robots-free configuration pointing at the mock sites
fn create_test_config(coptic: &MockServer, christianlib: &MockServer) -> Config {
    let mut config = Config::default();
    config.browser.engine = BrowserEngine::Http;
    config.scraper.respect_robots = false;
    config.scraper.delay_min_ms = 0;
    config.scraper.delay_max_ms = 0;
    config.scraper.retry_attempts = 1;
    config.scraper.retry_base_delay_ms = 1;
    config.scraper.navigation_timeout_secs = 5;
    config.sites.coptic.base_url = coptic.uri();
    config.sites.christianlib.base_url = christianlib.uri();
    config
}

/// Listing page with one `<article>` per title, linking straight to a PDF
fn listing_page(titles: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body><main>");
    for title in titles {
        let slug = title.to_lowercase().replace(' ', "-");
        html.push_str(&format!(
            r#"<article class="post"><h2 class="entry-title"><a href="/files/{}.pdf">{}</a></h2></article>"#,
            slug, title
        ));
    }
    if let Some(next) = next {
        html.push_str(&format!(r#"<a class="next page-numbers" href="{}">Next</a>"#, next));
    }
    html.push_str("</main></body></html>");
    html
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_coptic_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sections/books/"))
        .respond_with(html(listing_page(
            &["The Divine Liturgy", "The Agpeya"],
            Some("/sections/books/page/2/"),
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sections/books/page/2/"))
        .respond_with(html(listing_page(
            &["Lives of Saints"],
            Some("/sections/books/page/3/"),
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sections/books/page/3/"))
        .respond_with(html(listing_page(&["Coptic Hymns"], None)))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_coptic_only_search_stays_within_max_pages() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;
    mount_coptic_listing(&coptic).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&christianlib)
        .await;

    let coordinator = Coordinator::new(create_test_config(&coptic, &christianlib)).unwrap();
    let request = SearchRequest::new(Some(""), SiteScope::Only(Source::Coptic), 2, 6).unwrap();

    let outcome = coordinator.search(&request).await.unwrap();

    let titles: Vec<&str> = outcome.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["The Divine Liturgy", "The Agpeya", "Lives of Saints"]);
    assert!(outcome.items.iter().all(|r| r.source == Source::Coptic));
    assert_eq!(outcome.tried, vec!["listing:coptic"]);

    let first = &outcome.items[0];
    assert_eq!(
        first.download_url.as_deref(),
        Some(format!("{}/files/the-divine-liturgy.pdf", coptic.uri()).as_str())
    );
}

#[tokio::test]
async fn test_repeat_search_is_served_from_cache() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sections/books/"))
        .respond_with(html(listing_page(&["The Divine Liturgy"], None)))
        .expect(1)
        .mount(&coptic)
        .await;

    let coordinator = Coordinator::new(create_test_config(&coptic, &christianlib)).unwrap();
    let request =
        SearchRequest::new(Some("liturgy"), SiteScope::Only(Source::Coptic), 2, 6).unwrap();

    let first = coordinator.search(&request).await.unwrap();
    let second = coordinator.search(&request).await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.items, second.items);
    assert_eq!(second.tried, vec!["cache"]);
}

#[tokio::test]
async fn test_secondary_hop_fills_empty_results() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;
    mount_coptic_listing(&coptic).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", "antony"))
        .respond_with(html(
            r#"<html><body>
                <a href="/category/fathers/">Fathers</a>
                <a href="/life-of-antony/">The Life of Antony</a>
            </body></html>"#
                .to_string(),
        ))
        .mount(&christianlib)
        .await;

    Mock::given(method("GET"))
        .and(path("/life-of-antony/"))
        .respond_with(html(
            r#"<html><body>
                <h1 class="entry-title">The Life of Antony</h1>
                <div class="entry-content"><a href="/wp-content/uploads/antony.pdf">Download</a></div>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&christianlib)
        .await;

    let coordinator = Coordinator::new(create_test_config(&coptic, &christianlib)).unwrap();
    let request = SearchRequest::new(Some("antony"), SiteScope::All, 2, 6).unwrap();

    let outcome = coordinator.search(&request).await.unwrap();

    assert_eq!(outcome.items.len(), 1);
    let record = &outcome.items[0];
    assert_eq!(record.title, "The Life of Antony");
    assert_eq!(record.source, Source::ChristianLib);
    assert_eq!(
        record.download_url.as_deref(),
        Some(format!("{}/wp-content/uploads/antony.pdf", christianlib.uri()).as_str())
    );
    assert!(outcome.tried.iter().any(|t| t == "secondary_hop"));
}

#[tokio::test]
async fn test_secondary_hop_moves_on_when_candidates_do_not_match() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;
    mount_coptic_listing(&coptic).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", "antony"))
        .respond_with(html(
            r#"<a href="/antony-icons/">Icons tagged antony</a>"#.to_string(),
        ))
        .mount(&christianlib)
        .await;

    Mock::given(method("GET"))
        .and(path("/antony-icons/"))
        .respond_with(html(
            "<h1>Icon Gallery</h1><article>Coptic icons of the desert fathers.</article>"
                .to_string(),
        ))
        .expect(1)
        .mount(&christianlib)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/antony"))
        .respond_with(html(
            r#"<a href="/life-of-antony/">The Life of Antony</a>"#.to_string(),
        ))
        .mount(&christianlib)
        .await;

    Mock::given(method("GET"))
        .and(path("/life-of-antony/"))
        .respond_with(html(
            r#"<h1 class="entry-title">The Life of Antony</h1>
               <div class="entry-content"><a href="/wp-content/uploads/antony.pdf">Download</a></div>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&christianlib)
        .await;

    let coordinator = Coordinator::new(create_test_config(&coptic, &christianlib)).unwrap();
    let request = SearchRequest::new(Some("antony"), SiteScope::All, 1, 6).unwrap();

    let outcome = coordinator.search(&request).await.unwrap();

    let titles: Vec<&str> = outcome.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["The Life of Antony"]);
    assert!(outcome.tried.iter().any(|t| t == "secondary_hop"));
}

#[tokio::test]
async fn test_no_secondary_hop_when_primary_succeeds() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sections/books/"))
        .respond_with(html(listing_page(&["Life of Antony the Great"], None)))
        .mount(&coptic)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", "antony"))
        .respond_with(html(
            r#"<a href="/life-of-antony/">The Life of Antony</a>"#.to_string(),
        ))
        .mount(&christianlib)
        .await;

    Mock::given(method("GET"))
        .and(path("/life-of-antony/"))
        .respond_with(html("<h1>The Life of Antony</h1>".to_string()))
        .expect(0)
        .mount(&christianlib)
        .await;

    let coordinator = Coordinator::new(create_test_config(&coptic, &christianlib)).unwrap();
    let request = SearchRequest::new(Some("antony"), SiteScope::All, 2, 6).unwrap();

    let outcome = coordinator.search(&request).await.unwrap();

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].source, Source::Coptic);
    assert!(!outcome.tried.iter().any(|t| t == "secondary_hop"));
}

#[tokio::test]
async fn test_failing_site_is_recorded_and_skipped() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;
    mount_coptic_listing(&coptic).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&christianlib)
        .await;

    let coordinator = Coordinator::new(create_test_config(&coptic, &christianlib)).unwrap();
    let request = SearchRequest::new(None, SiteScope::All, 1, 6).unwrap();

    let outcome = coordinator.search(&request).await.unwrap();

    assert_eq!(outcome.items.len(), 2);
    assert!(outcome.items.iter().all(|r| r.source == Source::Coptic));
    assert_eq!(
        outcome.tried,
        vec!["listing:coptic", "listing:christianlib", "error:christianlib"]
    );
}

#[tokio::test]
async fn test_duplicate_entries_merged() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sections/books/"))
        .respond_with(html(listing_page(
            &["The Agpeya", "The Agpeya", "The Divine Liturgy"],
            None,
        )))
        .mount(&coptic)
        .await;

    let coordinator = Coordinator::new(create_test_config(&coptic, &christianlib)).unwrap();
    let request = SearchRequest::new(None, SiteScope::Only(Source::Coptic), 1, 6).unwrap();

    let outcome = coordinator.search(&request).await.unwrap();
    assert_eq!(outcome.items.len(), 2);
}

#[tokio::test]
async fn test_robots_disallow_skips_site_quietly() {
    let coptic = MockServer::start().await;
    let christianlib = MockServer::start().await;
    mount_coptic_listing(&coptic).await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /sections/"))
        .mount(&coptic)
        .await;

    let mut config = create_test_config(&coptic, &christianlib);
    config.scraper.respect_robots = true;
    let coordinator = Coordinator::new(config).unwrap();
    let request = SearchRequest::new(None, SiteScope::Only(Source::Coptic), 2, 6).unwrap();

    let outcome = coordinator.search(&request).await.unwrap();

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.tried, vec!["listing:coptic"]);
}
