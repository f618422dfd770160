//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against a temporary SQLite database.

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use topic_crawler::config::Config;
use topic_crawler::crawler::run_crawl;
use topic_crawler::storage::SqliteStorage;
use topic_crawler::{Checkpoint, CheckpointStore, CrawlError, CrawlPhase, CrawlState, VisitedSet};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.workers = Some(2);
    config.crawler.checkpoint_path = dir
        .path()
        .join("checkpoint.json")
        .to_string_lossy()
        .into_owned();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.request_timeout_secs = 1;
    config.output.database_path = dir.path().join("results.db").to_string_lossy().into_owned();
    config
}

fn html_page(title: &str, text: &str, links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<a href="{}">Link {}</a>"#, href, i))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
            title, text, anchors
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, page: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(page)
        .mount(server)
        .await;
}

fn open_results(config: &Config) -> SqliteStorage {
    SqliteStorage::new(
        Path::new(&config.output.database_path),
        &config.output.results_table,
    )
    .expect("Failed to open results database")
}

#[tokio::test]
async fn test_full_crawl_respects_depth() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            "league team match",
            &[format!("{}/page1", base), format!("{}/page2", base)],
        ),
    )
    .await;
    mount_page(
        &server,
        "/page1",
        html_page(
            "Lab",
            "physics research experiment",
            &[format!("{}/", base), format!("{}/page2", base)],
        ),
    )
    .await;
    mount_page(
        &server,
        "/page2",
        html_page("Deeper", "market finance", &[format!("{}/deep", base)]),
    )
    .await;
    mount_page(&server, "/deep", html_page("Deep", "film", &[])).await;

    let config = create_test_config(&dir);
    let seed = format!("{}/", base);
    let report = run_crawl(&config, &seed, 2, false, None).await.unwrap();

    assert_eq!(report.phase, CrawlPhase::DepthLimitReached);
    assert_eq!(report.waves.len(), 2);
    assert!(!CheckpointStore::new(&config.crawler.checkpoint_path).exists());

    let storage = open_results(&config);
    let mut records = storage.load_records().unwrap();
    records.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].url, seed);
    assert_eq!(records[0].depth, 0);
    assert_eq!(records[0].source_url, None);
    assert_eq!(records[0].title, "Home");
    assert_eq!(records[0].topic, "sports");

    assert_eq!(records[1].url, format!("{}/page1", base));
    assert_eq!(records[1].depth, 1);
    assert_eq!(records[1].source_url.as_deref(), Some(seed.as_str()));
    assert_eq!(records[1].topic, "science");

    assert_eq!(records[2].url, format!("{}/page2", base));
    assert_eq!(records[2].topic, "business");

    let links: Vec<String> = serde_json::from_str(&records[2].links).unwrap();
    assert_eq!(links, vec![format!("{}/deep", base)]);

    // /deep sits at the depth bound and is never fetched
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/deep"));
}

#[tokio::test]
async fn test_failure_halts_then_resume_completes() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            "software code",
            &[format!("{}/slow", base), format!("{}/fast", base)],
        ),
    )
    .await;
    mount_page(&server, "/fast", html_page("Fast", "game", &[])).await;

    // The first request for /slow outlives the client timeout
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("Slow", "music", &[]).set_delay(Duration::from_secs(3)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_page(&server, "/slow", html_page("Slow", "music", &[])).await;

    let config = create_test_config(&dir);
    let seed = format!("{}/", base);

    let first = run_crawl(&config, &seed, 3, false, None).await.unwrap();
    assert_eq!(first.phase, CrawlPhase::HaltedOnFailure);
    assert_eq!(first.failed.len(), 1);
    assert_eq!(first.failed[0].url, format!("{}/slow", base));

    let store = CheckpointStore::new(&config.crawler.checkpoint_path);
    let checkpoint = store.load().unwrap().expect("checkpoint should be written");
    assert_eq!(checkpoint.pending.len(), 1);
    assert_eq!(checkpoint.pending[0].url, format!("{}/slow", base));
    assert_eq!(checkpoint.pending[0].depth, 1);
    assert!(checkpoint.visited.contains(&format!("{}/fast", base)));

    match first.into_result() {
        Err(CrawlError::HaltedOnFailure { failed, .. }) => assert_eq!(failed, 1),
        other => panic!("expected a failure halt, got {:?}", other),
    }

    let second = run_crawl(&config, &seed, 3, false, None).await.unwrap();
    assert_eq!(second.phase, CrawlPhase::Exhausted);
    assert_eq!(second.waves.len(), 1);
    assert_eq!(second.waves[0].dispatched[0].url, format!("{}/slow", base));

    let storage = open_results(&config);
    assert_eq!(storage.count_records().unwrap(), 3);
    assert_eq!(storage.count_unique_urls().unwrap(), 3);

    // The checkpoint is left in place after a successful resume
    assert!(store.exists());
}

#[tokio::test]
async fn test_fresh_crawl_ignores_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page("Home", "vote", &[])).await;

    let config = create_test_config(&dir);
    let store = CheckpointStore::new(&config.crawler.checkpoint_path);
    let stale = format!("{}/stale", base);
    let visited: VisitedSet = [stale.as_str()].into_iter().collect();
    store
        .save(&Checkpoint::new(vec![CrawlState::seed(stale.clone())], &visited, None))
        .unwrap();

    let seed = format!("{}/", base);
    let report = run_crawl(&config, &seed, 1, true, None).await.unwrap();

    assert_eq!(report.phase, CrawlPhase::Exhausted);
    assert_eq!(report.waves[0].dispatched[0].url, seed);

    let records = open_results(&config).load_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, "politics");
    assert!(store.exists());
}

#[tokio::test]
async fn test_error_status_pages_are_still_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page("Home", "doctor", &[format!("{}/gone", base)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html><title>Gone</title></html>"))
        .mount(&server)
        .await;

    let config = create_test_config(&dir);
    let report = run_crawl(&config, &format!("{}/", base), 2, false, None)
        .await
        .unwrap();

    assert_eq!(report.phase, CrawlPhase::Exhausted);
    let storage = open_results(&config);
    assert_eq!(storage.count_records().unwrap(), 2);
}
