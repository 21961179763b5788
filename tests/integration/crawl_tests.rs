//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the real HTTP fetcher, robots.txt source
//! and JSON page store.

use crawl_ledger::config::UserAgentConfig;
use crawl_ledger::crawler::{
    build_http_client, build_robots_client, CrawlEngine, EngineSettings, HttpFetcher,
};
use crawl_ledger::output::FileReportSink;
use crawl_ledger::robots::{HttpRobotsSource, RobotsGate};
use crawl_ledger::storage::{JsonFilePageStore, PageStore};
use crawl_ledger::CrawlError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an engine wired to real HTTP components, storing under `dir`
fn create_engine(dir: &Path, max_depth: u32) -> CrawlEngine {
    let user_agent = UserAgentConfig::default();
    let client = build_http_client(&user_agent, Duration::from_secs(5))
        .expect("Failed to build HTTP client");
    let robots_client = build_robots_client(&user_agent, Duration::from_secs(5))
        .expect("Failed to build robots.txt client");

    let robots = Arc::new(RobotsGate::new(
        Arc::new(HttpRobotsSource::new(robots_client)),
        Duration::from_secs(5),
    ));
    let store = Arc::new(JsonFilePageStore::new(&dir.join("pages")).expect("Failed to open store"));

    CrawlEngine::new(
        EngineSettings {
            max_depth,
            max_concurrent: 4,
            fetch_timeout: Duration::from_secs(5),
        },
        Arc::new(HttpFetcher::new(client)),
        robots,
        store,
    )
    .with_report_sink(Arc::new(FileReportSink::new(&dir.join("report"))))
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

fn read_report_file(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join("report").join(name)).expect("Report file missing")
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn test_crawl_follows_links_across_origins() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let base = server.uri();
    let other_base = other.uri();

    mount_page(
        &server,
        "/a",
        &format!(r#"<a href="/b">B</a> <a href="{}/c">C</a>"#, other_base),
    )
    .await;
    mount_page(&server, "/b", r#"<a href="/deeper">too deep</a>"#).await;
    mount_page(&other, "/c", "other origin").await;

    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html_page("never"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 1);

    let report = engine
        .run(&[format!("{}/a", base)], CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.total_counted, 3);
    assert_eq!(report.total_processed, 3);
    assert!(report.uncrawled.is_empty());
    assert!(report.forbidden.is_empty());

    let frontier = engine.frontier();
    assert_eq!(frontier.depth_of(&url(&format!("{}/b", base))), Some(1));
    assert_eq!(frontier.depth_of(&url(&format!("{}/c", other_base))), Some(1));

    let store = JsonFilePageStore::new(&dir.path().join("pages")).unwrap();
    assert_eq!(store.count().unwrap(), 3);

    assert_eq!(read_report_file(dir.path(), "uncrawled_urls.txt"), "");
    assert_eq!(read_report_file(dir.path(), "forbidden_urls.txt"), "");
}

#[tokio::test]
async fn test_robots_txt_blocks_seed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/a"))
        .respond_with(html_page("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 2);
    let seed = format!("{}/private/a", base);

    let result = engine
        .run(&[seed.clone()], CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(CrawlError::NoAdmissibleSeeds { forbidden: 1 })
    ));
    assert_eq!(engine.frontier().counted_len(), 0);
    assert_eq!(
        read_report_file(dir.path(), "forbidden_urls.txt"),
        format!("{}\n", seed)
    );
}

#[tokio::test]
async fn test_robots_txt_blocks_discovered_link() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_page(
        &server,
        "/",
        r#"<a href="/admin/panel">admin</a><a href="/public">public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "hello").await;

    Mock::given(method("GET"))
        .and(path("/admin/panel"))
        .respond_with(html_page("admin"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 2);

    let report = engine
        .run(&[format!("{}/", base)], CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total_counted, 2);
    assert!(report
        .forbidden
        .contains(&format!("{}/admin/panel", base)));
}

#[tokio::test]
async fn test_forbidden_response_is_not_expanded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/locked">locked</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/locked"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string(r#"<html><body><a href="/behind">x</a></body></html>"#)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/behind"))
        .respond_with(html_page("hidden"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 3);

    let report = engine
        .run(&[format!("{}/", base)], CancellationToken::new())
        .await
        .unwrap();

    let locked = url(&format!("{}/locked", base));
    assert!(engine.frontier().is_processed(&locked));
    assert!(engine.frontier().is_forbidden(&locked));
    assert!(report.uncrawled.is_empty());
    assert_eq!(
        read_report_file(dir.path(), "forbidden_urls.txt"),
        format!("{}\n", locked)
    );

    let store = JsonFilePageStore::new(&dir.path().join("pages")).unwrap();
    assert!(store.load(locked.as_str()).unwrap().is_none());
}

#[tokio::test]
async fn test_link_reached_by_two_paths_is_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/a">a</a><a href="/shared">s</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/shared">s again</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html_page("shared"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 2);

    engine
        .run(&[format!("{}/", base)], CancellationToken::new())
        .await
        .unwrap();

    let shared = format!("{}/shared", base);
    assert_eq!(engine.frontier().depth_of(&url(&shared)), Some(1));

    let store = JsonFilePageStore::new(&dir.path().join("pages")).unwrap();
    assert_eq!(store.load(&shared).unwrap().unwrap().depth, 1);
}

#[tokio::test]
async fn test_stored_document_content() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><head><title>Home Page</title><style>p { color: red }</style></head>
                    <body><p>Hello   there</p><script>var x = 1;</script></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 0);

    engine
        .run(&[format!("{}/", base)], CancellationToken::new())
        .await
        .unwrap();

    let store = JsonFilePageStore::new(&dir.path().join("pages")).unwrap();
    let page = store.load(&format!("{}/", base)).unwrap().unwrap();

    assert_eq!(page.title.as_deref(), Some("Home Page"));
    assert_eq!(page.content, "Home Page Hello there");
    assert_eq!(page.depth, 0);
}

#[tokio::test]
async fn test_redirect_uses_final_url_as_link_base() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/home"))
        .mount(&server)
        .await;
    mount_page(&server, "/new/home", r#"<a href="sibling">sibling</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/new/sibling"))
        .respond_with(html_page("sibling"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 1);

    let report = engine
        .run(&[format!("{}/old", base)], CancellationToken::new())
        .await
        .unwrap();

    assert!(report.uncrawled.is_empty());

    let store = JsonFilePageStore::new(&dir.path().join("pages")).unwrap();
    let page = store.load(&format!("{}/old", base)).unwrap().unwrap();
    assert_eq!(page.final_url, format!("{}/new/home", base));
}

#[tokio::test]
async fn test_redirect_into_disallowed_path_is_not_requested() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/open"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/private/x"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/x"))
        .respond_with(html_page("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 2);

    let report = engine
        .run(&[format!("{}/open", base)], CancellationToken::new())
        .await
        .unwrap();

    assert!(report.uncrawled.is_empty());
    assert!(report.forbidden.contains(&format!("{}/private/x", base)));
    assert!(read_report_file(dir.path(), "forbidden_urls.txt").contains("/private/x"));

    let store = JsonFilePageStore::new(&dir.path().join("pages")).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/doc.pdf">pdf</a><a href="/missing">missing</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 1);

    let report = engine
        .run(&[format!("{}/", base)], CancellationToken::new())
        .await
        .unwrap();

    // Both failures still count as processed
    assert_eq!(report.total_counted, 3);
    assert_eq!(report.total_processed, 3);
    assert!(report.forbidden.is_empty());

    let store = JsonFilePageStore::new(&dir.path().join("pages")).unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn test_unreachable_robots_txt_fails_open() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/next">next</a>"#).await;
    mount_page(&server, "/next", "next").await;

    let dir = TempDir::new().unwrap();
    let engine = create_engine(dir.path(), 1);

    let report = engine
        .run(&[format!("{}/", base)], CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total_processed, 2);
    assert!(report.forbidden.is_empty());
}
