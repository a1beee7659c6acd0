//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the reqwest transport.

use spoder::config::Config;
use spoder::crawler::{crawl, CrawlSummary, HttpTransport, ShutdownOutcome, ShutdownReason};
use spoder::extract::ArtifactStore;
use spoder::output::{write_report, CrawlReport};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling from the given seed
fn create_test_config(seed: String) -> Config {
    let mut config = Config::default();
    config.crawler.seed = Some(seed);
    config.crawler.threads = 4;
    config.shutdown.grace_period_ms = 200;
    config
}

async fn run_crawl(config: &Config) -> (CrawlSummary, Arc<ArtifactStore>) {
    config.validate().expect("Invalid test configuration");
    let transport = HttpTransport::new(&config.transport).expect("Failed to build transport");
    let store = Arc::new(ArtifactStore::new());

    let summary = crawl(
        config,
        Arc::new(transport),
        Arc::clone(&store),
        std::future::pending::<()>(),
    )
    .await
    .expect("Crawl failed");

    (summary, store)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(hits)
        .mount(server)
        .await;
}

fn link_strings(store: &ArtifactStore) -> Vec<String> {
    store.links().iter().map(|l| l.to_string()).collect()
}

#[tokio::test]
async fn test_seed_page_at_depth_one() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body>
        <a href="/about">About</a>
        <p>Contact us at test@example.com or call 555-123-4567.</p>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/about", "<p>about</p>", 0).await;

    let config = create_test_config(format!("{}/", base_url));
    let (summary, store) = run_crawl(&config).await;

    assert_eq!(summary.reason, ShutdownReason::FrontierExhausted);
    assert_eq!(summary.outcome, ShutdownOutcome::Graceful);
    assert_eq!(link_strings(&store), vec![format!("{}/about", base_url)]);
    assert_eq!(store.emails(), vec!["test@example.com"]);
    assert_eq!(store.phone_numbers(), vec!["555-123-4567"]);

    // The seed plus the unfetched child
    assert_eq!(summary.registered_tasks, 2);
}

#[tokio::test]
async fn test_recursive_crawl_follows_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/a">A</a>"#, 1).await;
    mount_page(
        &mock_server,
        "/a",
        r#"<a href="b">B</a> mail sales@example.com"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/b", r#"<a href="/a">back to A</a>"#, 1).await;

    let mut config = create_test_config(format!("{}/", base_url));
    config.crawler.recursive = true;
    let (summary, store) = run_crawl(&config).await;

    assert_eq!(summary.reason, ShutdownReason::FrontierExhausted);
    assert_eq!(
        link_strings(&store),
        vec![format!("{}/a", base_url), format!("{}/b", base_url)]
    );
    assert_eq!(store.emails(), vec!["sales@example.com"]);
    assert_eq!(summary.registered_tasks, 3);
}

#[tokio::test]
async fn test_depth_limit_stops_recursion() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/one">1</a>"#, 1).await;
    mount_page(&mock_server, "/one", r#"<a href="/two">2</a>"#, 1).await;
    mount_page(&mock_server, "/two", "unreached", 0).await;

    let mut config = create_test_config(format!("{}/", base_url));
    config.crawler.recursive = true;
    config.crawler.depth = Some(2);
    let (summary, store) = run_crawl(&config).await;

    assert_eq!(summary.reason, ShutdownReason::FrontierExhausted);
    assert_eq!(store.link_count(), 2);
}

#[tokio::test]
async fn test_base_tag_redirects_relative_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<html><head><base href="{}/docs/"></head>
            <body><a href="intro">Intro</a></body></html>"#,
            base_url
        ),
        1,
    )
    .await;
    mount_page(&mock_server, "/docs/intro", "introduction", 1).await;
    mount_page(&mock_server, "/intro", "wrong base", 0).await;

    let mut config = create_test_config(format!("{}/", base_url));
    config.crawler.recursive = true;
    let (_, store) = run_crawl(&config).await;

    assert_eq!(
        link_strings(&store),
        vec![format!("{}/docs/intro", base_url)]
    );
}

#[tokio::test]
async fn test_error_status_is_not_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">gone</a><a href="/broken">broken</a><a href="/ok">ok</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("call 555-000-1111"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", "write to ok@example.com", 1).await;

    let mut config = create_test_config(format!("{}/", base_url));
    config.crawler.recursive = true;
    let (summary, store) = run_crawl(&config).await;

    assert_eq!(summary.reason, ShutdownReason::FrontierExhausted);
    assert_eq!(store.link_count(), 3);
    assert_eq!(store.emails(), vec!["ok@example.com"]);
    // Error pages are not scanned
    assert!(store.phone_numbers().is_empty());
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let location = format!("{}/home", base_url);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", location.as_str()))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/home", "reach us at home@example.com", 1).await;

    let config = create_test_config(format!("{}/", base_url));
    let (_, store) = run_crawl(&config).await;

    assert_eq!(store.emails(), vec!["home@example.com"]);
}

#[tokio::test]
async fn test_cookie_and_user_agent_headers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "session=abc; theme=dark"))
        .and(header("user-agent", "SpoderTest/1.0"))
        .respond_with(html("authenticated 555-123-4567"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(format!("{}/", base_url));
    config.transport.cookies = Some(" session=abc ;theme=dark; ".to_string());
    config.transport.user_agent = "SpoderTest/1.0".to_string();
    let (_, store) = run_crawl(&config).await;

    assert_eq!(store.phone_numbers(), vec!["555-123-4567"]);
}

#[tokio::test]
async fn test_custom_patterns() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "ticket AB-1234 and test@example.com and 555-123-4567",
        1,
    )
    .await;

    let mut config = create_test_config(format!("{}/", base_url));
    config.patterns.telephone = Some(r"^[A-Z]{2}-\d{4}$".to_string());
    let (_, store) = run_crawl(&config).await;

    assert_eq!(store.phone_numbers(), vec!["AB-1234"]);
    assert_eq!(store.emails(), vec!["test@example.com"]);
}

#[tokio::test]
async fn test_cancellation_stops_slow_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("slow").set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/", base_url));
    let transport = HttpTransport::new(&config.transport).unwrap();
    let store = Arc::new(ArtifactStore::new());

    let summary = crawl(
        &config,
        Arc::new(transport),
        Arc::clone(&store),
        tokio::time::sleep(Duration::from_millis(100)),
    )
    .await
    .unwrap();

    assert_eq!(summary.reason, ShutdownReason::Cancelled);
    assert_eq!(summary.outcome, ShutdownOutcome::Forced);
    assert!(summary.duration < Duration::from_secs(5));
    assert_eq!(store.link_count(), 0);
}

#[tokio::test]
async fn test_report_is_appended_to_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/x">x</a> write to a@example.com or b@example.com"#,
        1,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results.txt");

    let mut config = create_test_config(format!("{}/", base_url));
    config.output.path = Some(output.clone());
    let (summary, store) = run_crawl(&config).await;

    let report = CrawlReport::new(&store, summary);
    write_report(&report, config.output.path.as_deref()).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains(&format!("{}/x\n", base_url)));
    assert!(content.contains("a@example.com\nb@example.com\n"));
    assert!(content.contains("Number of links found: 1"));
    assert!(content.contains("Number of emails found: 2"));
    assert!(content.contains("Number of phone numbers found: 0"));
}
