//! Integration tests for the crawl engine
//!
//! These tests run full crawls against wiremock HTTP servers with the HTTP
//! renderer backend, asserting the engine's observable properties: dedup,
//! depth and page bounds, domain restriction, error recovery, idempotent
//! re-runs, and stop cleanliness.

use harvestman::config::CrawlConfig;
use harvestman::crawler::{ControlHandle, Coordinator, HttpRenderer};
use harvestman::events::EventSender;
use harvestman::storage::{SqliteStore, Store, TaskStatus};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a run configuration pointed at a mock server
fn test_config(server_uri: &str, dir: &TempDir) -> CrawlConfig {
    let mut config: CrawlConfig = toml::from_str(&format!(
        r#"
start-url = "{}/"
save-path = "placeholder"
"#,
        server_uri
    ))
    .unwrap();
    config.save_path = dir.path().join("harvest");
    config.database_path = dir.path().join("harvest.db");
    config.delay_ms = 0;
    config.max_retries = 1;
    config
}

async fn run_to_end(config: CrawlConfig) -> (i64, SqliteStore) {
    run_with_control(config, ControlHandle::new()).await
}

async fn run_with_control(config: CrawlConfig, control: ControlHandle) -> (i64, SqliteStore) {
    let db_path = config.database_path.clone();
    let mut coordinator = Coordinator::new(
        config,
        HttpRenderer::new(),
        EventSender::disabled(),
        control,
    )
    .expect("failed to create coordinator");
    let task_id = coordinator.task_id();

    coordinator.run().await.expect("crawl failed");
    drop(coordinator);

    let store = SqliteStore::new(&db_path).expect("failed to reopen database");
    (task_id, store)
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_domain_restriction_and_depth() {
    // A links B, C, D (same host) and E (different host); with domain_limit
    // on, max_depth 1, and max_pages 5, exactly {A, B, C, D} are processed
    // and E is never rendered.
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/b">B</a> <a href="/c">C</a> <a href="/d">D</a>
               <a href="http://elsewhere.invalid/e">E</a>"#,
        ))
        .mount(&server)
        .await;
    for p in ["/b", "/c", "/d"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(html_page("leaf"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri(), &dir);
    config.max_depth = 1;
    config.max_pages = 5;

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.counters.pages, 4);
    assert_eq!(task.counters.errors, 0);
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_depth_bound() {
    // Chain / -> l1 -> l2; with max_depth 1, l2 is never enqueued
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/l1">L1</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/l1"))
        .respond_with(html_page(r#"<a href="/l2">L2</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/l2"))
        .respond_with(html_page("too deep"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri(), &dir);
    config.max_depth = 1;

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.counters.pages, 2);
}

#[tokio::test]
async fn test_page_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/p1">1</a> <a href="/p2">2</a> <a href="/p3">3</a>"#,
        ))
        .mount(&server)
        .await;
    for p in ["/p1", "/p2", "/p3"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(html_page("page"))
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri(), &dir);
    config.max_pages = 2;

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.counters.pages, 2);
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_no_revisit_on_cycles() {
    // A and B link to each other; each is rendered exactly once
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/b">B</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(r#"<a href="/">home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri(), &dir);
    config.max_depth = 5;

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.counters.pages, 2);
}

#[tokio::test]
async fn test_resource_dedup_across_pages() {
    // Two pages both reference img1.png -> one download attempt, one
    // resource row, images counter 1
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<img src="/img1.png"> <a href="/b">B</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(r#"<img src="/img1.png">"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), &dir);
    let save_path = config.save_path.clone();

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.counters.images, 1);
    assert_eq!(task.counters.total_size, 64);

    let resources = store.list_resources(task_id).unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].resource_type, "images");

    assert!(save_path.join("images").join("img1.png").exists());
}

#[tokio::test]
async fn test_resource_404_recorded_and_crawl_continues() {
    // A resource fetch that returns 404 yields errors counter 1 and one
    // error record with that URL; page processing continues normally
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<img src="/missing.png"> <a href="/next">next</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html_page("still crawling"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), &dir);

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.counters.pages, 2);
    assert_eq!(task.counters.errors, 1);
    assert_eq!(task.counters.images, 0);

    let errors = store.list_errors(task_id).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].url.ends_with("/missing.png"));
}

#[tokio::test]
async fn test_page_render_failure_continues_traversal() {
    // A page that renders with a non-2xx status is recorded as an error and
    // skipped; the rest of the frontier is still visited
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/broken">x</a> <a href="/ok">y</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_page("fine"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), &dir);

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    // The broken page is still counted as a visited page
    assert_eq!(task.counters.pages, 3);
    assert_eq!(task.counters.errors, 1);
    assert_eq!(task.status, TaskStatus::Completed);

    let errors = store.list_errors(task_id).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].error_message.contains("500"));
}

#[tokio::test]
async fn test_idempotent_rerun_skips_existing_files() {
    // Re-running with the same save_path re-skips files that are already
    // present, with no duplicate network fetch
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<img src="/img1.png">"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 16]))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), &dir);

    // Seed the save path as a previous run would have left it
    let images = config.save_path.join("images");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("img1.png"), b"from previous run").unwrap();

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    // Skip is a no-op: no row, no counter, no error
    assert_eq!(task.counters.images, 0);
    assert_eq!(task.counters.errors, 0);
    assert!(store.list_resources(task_id).unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_cleanliness() {
    // A stop observed at the loop boundary finalizes the task as `stopped`
    // with an end time and renders nothing further
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server.uri(), &dir);

    let control = ControlHandle::new();
    control.stop();

    let (task_id, store) = run_with_control(config, control).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.status, TaskStatus::Stopped);
    assert_eq!(task.counters.pages, 0);
    assert!(task.end_time.is_some());
}

#[tokio::test]
async fn test_category_toggles_gate_downloads() {
    // Only toggled-on categories are collected; stylesheets and scripts
    // land in the shared `others` bucket when enabled
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<img src="/a.png">
               <link rel="stylesheet" href="/style.css">
               <script src="/app.js"></script>
               <a href="/report.pdf">report</a>"#,
        ))
        .mount(&server)
        .await;
    for (p, body) in [
        ("/a.png", vec![1u8; 10]),
        ("/style.css", vec![2u8; 20]),
        ("/report.pdf", vec![3u8; 30]),
    ] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;
    }
    // Scripts stay toggled off and must never be requested
    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri(), &dir);
    config.max_depth = 0;
    config.resources.stylesheets = true;

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    assert_eq!(task.counters.images, 1);
    assert_eq!(task.counters.documents, 1);
    assert_eq!(task.counters.others, 1);
    assert_eq!(task.counters.total_size, 60);

    let resources = store.list_resources(task_id).unwrap();
    assert_eq!(resources.len(), 3);
}

#[tokio::test]
async fn test_config_snapshot_stored_with_task() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("hello"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri(), &dir);
    config.max_depth = 7;

    let (task_id, store) = run_to_end(config).await;

    let task = store.get_task(task_id).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&task.config).unwrap();
    assert_eq!(snapshot["max-depth"], 7);
}
