//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl → rank → search cycle end-to-end.

use std::path::Path;
use sumi_seek::config::{Config, CrawlerConfig, IndexConfig, RankConfig, SearchConfig};
use sumi_seek::config::UserAgentConfig;
use sumi_seek::crawler::{run_crawl, StopHandle};
use sumi_seek::output::METRICS_HEADER;
use sumi_seek::storage::{open_index, IndexStore};
use sumi_seek::{PageRanker, SeekError, Searcher};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with fast idle polling
fn create_test_config(seeds: Vec<String>, max_depth: u32, dir: &Path) -> Config {
    let mut crawler = CrawlerConfig::with_seeds(seeds);
    crawler.max_depth = max_depth;
    crawler.batch_size = 4;
    crawler.max_retries = 1;
    crawler.retry_backoff_ms = 10;
    crawler.connect_timeout_ms = 1_000;
    crawler.total_timeout_ms = 2_000;
    crawler.idle_poll_interval_ms = 100;
    crawler.idle_polls_before_exit = 2;

    Config {
        crawler,
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        index: IndexConfig {
            database_path: dir.join("index.db").to_string_lossy().into_owned(),
            metrics_path: dir.join("statistics.csv").to_string_lossy().into_owned(),
            metrics_interval: 1,
        },
        rank: RankConfig::default(),
        search: SearchConfig::default(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crawl_rank_search_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<p>alpha one two beta</p><a href="{}/next">next page</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Depth 0 crawl never follows the link
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<p>alpha beta</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], 0, dir.path());

    let report = run_crawl(config.clone(), StopHandle::new()).await.unwrap();
    assert_eq!(report.pages_crawled, 1);
    assert!(report.failed_urls.is_empty());
    assert!(!report.stopped);

    let mut index = open_index(Path::new(&config.index.database_path)).unwrap();
    let counts = index.table_counts().unwrap();
    assert_eq!(counts.url_list, 2);
    assert_eq!(counts.link_between_url, 1);
    assert_eq!(counts.link_word, 2);

    // Searching before ranking is refused
    let before = Searcher::new(&index, 10).search("alpha beta");
    assert!(matches!(before, Err(SeekError::RanksNotComputed)));

    PageRanker::new(&config.rank).rank_index(&mut index).unwrap();

    let index = open_index(Path::new(&config.index.database_path)).unwrap();
    let results = Searcher::new(&index, 10).search("alpha beta").unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, base_url);
    assert!((results[0].distance_score - 1.0).abs() < 1e-9);
    assert!((results[0].authority_score - 1.0).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<a href="{0}/page1">first</a><a href="{0}/missing">broken</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(&format!(
            r#"<p>deeper</p><a href="{}/page2">second</a><a href="{}/">home</a>"#,
            base_url, base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<p>too deep</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(vec![base_url.clone()], 1, dir.path());

    let report = run_crawl(config.clone(), StopHandle::new()).await.unwrap();

    assert_eq!(report.pages_crawled, 2);
    assert_eq!(report.failed_urls, vec![format!("{}/missing", base_url)]);

    let index = open_index(Path::new(&config.index.database_path)).unwrap();
    assert!(index.url_id(&format!("{}/page2", base_url)).is_some());
    assert_eq!(index.table_counts().unwrap().link_between_url, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_pages_are_not_indexed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<p>landing page</p><a href="{0}/empty">nothing</a><a href="{0}/blank">spaces</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n\t "))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(vec![base_url.clone()], 1, dir.path());

    let report = run_crawl(config.clone(), StopHandle::new()).await.unwrap();

    assert_eq!(report.pages_crawled, 1);
    assert!(report.failed_urls.is_empty());

    // Only the landing page produced a metrics row
    let content = std::fs::read_to_string(&config.index.metrics_path).unwrap();
    assert_eq!(content.lines().count(), 2);

    // The empty pages exist only as link targets, with no words of their own
    let index = open_index(Path::new(&config.index.database_path)).unwrap();
    let empty_id = index.url_id(&format!("{}/empty", base_url)).unwrap();
    assert!(index.page_words(empty_id).unwrap().is_empty());
    assert_eq!(index.table_counts().unwrap().url_list, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_drains_frontier_into_failed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html("<p>never fetched</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(vec![base_url.clone()], 2, dir.path());

    let stop = StopHandle::new();
    stop.stop();
    let report = run_crawl(config.clone(), stop).await.unwrap();

    assert!(report.stopped);
    assert_eq!(report.pages_crawled, 0);
    assert_eq!(report.failed_urls, vec![base_url]);

    // The snapshot is still written
    assert!(Path::new(&config.index.database_path).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_metrics_are_sampled_while_crawling() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<p>home page</p><a href="{}/about">about us</a>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>about text</p>"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(vec![base_url], 1, dir.path());

    let report = run_crawl(config.clone(), StopHandle::new()).await.unwrap();
    assert_eq!(report.pages_crawled, 2);

    let content = std::fs::read_to_string(&config.index.metrics_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], METRICS_HEADER);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,"));
    assert!(lines[2].starts_with("2,"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_second_crawl_reuses_snapshot() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>stable words here</p>"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(vec![base_url.clone()], 0, dir.path());

    run_crawl(config.clone(), StopHandle::new()).await.unwrap();
    run_crawl(config.clone(), StopHandle::new()).await.unwrap();

    let index = open_index(Path::new(&config.index.database_path)).unwrap();
    let counts = index.table_counts().unwrap();
    assert_eq!(counts.url_list, 1);
    assert_eq!(counts.word_list, 3);
    assert_eq!(counts.word_location, 6);
    assert_eq!(index.url_id(&base_url), Some(1));
}
