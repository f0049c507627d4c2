//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the processing loop that coordinates the crawl:
//! - Seeding the frontier
//! - Spawning the fetch task
//! - Indexing every fetched page in the six index steps
//! - Following links up to the configured depth
//! - Sampling metrics and writing the final snapshot

use crate::config::Config;
use crate::crawler::context::{
    CrawlContext, CrawlReport, FetchedPage, FrontierEntry, IdlePolicy, ProcessChannels,
    StopHandle,
};
use crate::crawler::fetcher::{build_http_client, FetchWorker, RetryPolicy};
use crate::extractor::extract_elements;
use crate::output::{load_statistics, MetricsLog};
use crate::storage::{open_index, IndexStore, SqliteIndex, StorageResult};
use crate::url::canonicalize_seed;
use crate::SeekError;
use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// Main crawler coordinator structure
///
/// Owns the index for the duration of the crawl; it is the only writer.
pub struct Coordinator {
    config: Arc<Config>,
    index: SqliteIndex,
    client: Client,
    stop: StopHandle,
    metrics: Option<MetricsLog>,

    /// URLs indexed during this run
    crawled: HashSet<String>,

    /// URLs ever sent to the frontier during this run
    queued: HashSet<String>,

    pages_processed: u64,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `index` - The opened index to write into
    /// * `stop` - Flag checked by the fetch loop for cancellation
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SeekError)` - Failed to build the HTTP client or open the metrics log
    pub fn new(config: Config, index: SqliteIndex, stop: StopHandle) -> Result<Self, SeekError> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;

        let metrics = if config.index.metrics_interval > 0 {
            let log = MetricsLog::open(Path::new(&config.index.metrics_path))?;
            tracing::info!(
                "Sampling metrics every {} pages into {}",
                config.index.metrics_interval,
                log.path().display()
            );
            Some(log)
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            index,
            client,
            stop,
            metrics,
            crawled: HashSet::new(),
            queued: HashSet::new(),
            pages_processed: 0,
        })
    }

    /// The index being built
    pub fn index(&self) -> &SqliteIndex {
        &self.index
    }

    /// Runs the crawl until both loops go idle or a stop is requested
    ///
    /// The fetch task is always joined before the snapshot is written.
    pub async fn run(&mut self) -> Result<CrawlReport, SeekError> {
        let start = Instant::now();
        let config = Arc::clone(&self.config);
        let crawler = &config.crawler;
        let idle = IdlePolicy {
            poll_interval: crawler.idle_poll_interval(),
            polls_before_exit: crawler.idle_polls_before_exit,
        };

        let CrawlContext {
            stop,
            progress,
            fetch,
            process,
        } = CrawlContext::new(self.stop.clone());
        let ProcessChannels {
            frontier,
            mut pages,
            failed_tx,
            mut failed_rx,
        } = process;

        self.seed_frontier(&frontier)?;

        let worker = FetchWorker {
            client: self.client.clone(),
            channels: fetch,
            stop: stop.clone(),
            progress: progress.clone(),
            retry: RetryPolicy::from_config(crawler),
            idle,
            batch_size: crawler.batch_size,
        };
        let fetch_task = tokio::spawn(worker.run());

        tracing::info!(
            "Crawling from {} seed(s) up to depth {}",
            self.queued.len(),
            crawler.max_depth
        );

        let mut idle_polls = 0;
        loop {
            match tokio::time::timeout(idle.poll_interval, pages.recv()).await {
                Ok(Some(page)) => {
                    idle_polls = 0;
                    self.process_page(page, Some(&frontier), &failed_tx);
                    progress.page_done();
                }
                Ok(None) => {
                    tracing::debug!("Fetch task finished, processing loop exiting");
                    break;
                }
                Err(_) => {
                    if progress.in_flight() > 0 {
                        idle_polls = 0;
                        continue;
                    }
                    idle_polls += 1;
                    tracing::debug!("No pages to process ({} idle polls)", idle_polls);
                    if idle_polls >= idle.polls_before_exit {
                        tracing::info!("No pages arrived, processing loop exiting");
                        break;
                    }
                }
            }
        }

        drop(frontier);
        let fetched = fetch_task.await?;
        tracing::debug!("Fetch task handed over {} pages", fetched);

        // Pages that arrived after the loop ended are indexed without following links
        while let Ok(page) = pages.try_recv() {
            self.process_page(page, None, &failed_tx);
            progress.page_done();
        }

        drop(failed_tx);
        let mut failed_urls = Vec::new();
        while let Ok(url) = failed_rx.try_recv() {
            failed_urls.push(url);
        }

        self.index.save()?;

        Ok(CrawlReport {
            pages_crawled: self.pages_processed,
            failed_urls,
            elapsed: start.elapsed(),
            stopped: stop.is_stopped(),
        })
    }

    /// Canonicalizes the seeds and queues them at depth 0
    fn seed_frontier(&mut self, frontier: &UnboundedSender<FrontierEntry>) -> Result<(), SeekError> {
        for seed in &self.config.crawler.seeds {
            let url = canonicalize_seed(seed)?;
            if !self.queued.insert(url.clone()) {
                continue;
            }
            if frontier.send(FrontierEntry { url, depth: 0 }).is_err() {
                tracing::warn!("Frontier closed before seeding {}", seed);
            }
        }
        Ok(())
    }

    /// Indexes one fetched page and queues its links
    ///
    /// Links are only followed when `frontier` is given, the crawl is not
    /// stopping and the next depth is within the limit.
    fn process_page(
        &mut self,
        page: FetchedPage,
        frontier: Option<&UnboundedSender<FrontierEntry>>,
        failed: &UnboundedSender<String>,
    ) {
        if self.crawled.contains(&page.url) {
            tracing::debug!("Skipping already crawled {}", page.url);
            return;
        }

        let links = match self.index_page(&page.url, &page.body) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Failed to index {}: {}", page.url, e);
                let _ = failed.send(page.url);
                return;
            }
        };

        self.crawled.insert(page.url.clone());
        self.pages_processed += 1;
        tracing::debug!(
            "Indexed {} at depth {} ({} links)",
            page.url,
            page.depth,
            links.len()
        );

        let next_depth = page.depth + 1;
        if let Some(frontier) = frontier {
            if next_depth <= self.config.crawler.max_depth && !self.stop.is_stopped() {
                self.enqueue_links(links, next_depth, frontier, failed);
            }
        }

        self.sample_metrics();
    }

    /// Runs the six index steps for a page
    ///
    /// Returns the distinct link targets in document order. A failing step
    /// aborts the remaining ones; earlier steps are not rolled back.
    fn index_page(&mut self, url: &str, body: &str) -> StorageResult<Vec<String>> {
        let mut elements = extract_elements(body);

        let url_id = self.index.insert_url(url)?;
        self.index.insert_links_from_elements(&mut elements)?;
        self.index.insert_words_from_elements(&mut elements)?;
        self.index.insert_links_between(&mut elements, url_id)?;
        self.index.fill_word_locations(&elements, url_id)?;
        self.index.fill_link_words(&elements)?;

        let mut seen = HashSet::new();
        let links = elements
            .into_iter()
            .filter_map(|e| e.href)
            .filter(|href| seen.insert(href.clone()))
            .collect();
        Ok(links)
    }

    fn enqueue_links(
        &mut self,
        links: Vec<String>,
        depth: u32,
        frontier: &UnboundedSender<FrontierEntry>,
        failed: &UnboundedSender<String>,
    ) {
        for url in links {
            if self.crawled.contains(&url) || !self.queued.insert(url.clone()) {
                continue;
            }
            if let Err(rejected) = frontier.send(FrontierEntry { url, depth }) {
                let _ = failed.send(rejected.0.url);
            }
        }
    }

    /// Appends a metrics row every `metrics-interval` processed pages
    fn sample_metrics(&mut self) {
        let interval = self.config.index.metrics_interval;
        if interval == 0 || self.pages_processed % interval != 0 {
            return;
        }

        let Some(log) = self.metrics.as_mut() else {
            return;
        };

        let stats = match load_statistics(&self.index) {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Failed to collect metrics: {}", e);
                return;
            }
        };
        if let Err(e) = log.record(self.pages_processed, &stats) {
            tracing::warn!("Failed to write metrics to {}: {}", log.path().display(), e);
        }
    }
}

/// Runs a complete crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Open the index snapshot (or start an empty one)
/// 2. Seed the frontier and spawn the fetch task
/// 3. Index fetched pages and follow links up to `max-depth`
/// 4. Join the fetch task and write the snapshot
/// 5. Log the end-of-run summary
///
/// # Example
///
/// ```no_run
/// use sumi_seek::config::load_config;
/// use sumi_seek::crawler::{run_crawl, StopHandle};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config, StopHandle::new()).await?;
/// println!("{} pages crawled", report.pages_crawled);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, stop: StopHandle) -> Result<CrawlReport, SeekError> {
    let index = open_index(Path::new(&config.index.database_path))?;
    let mut coordinator = Coordinator::new(config, index, stop)?;
    let report = coordinator.run().await?;
    report.log_summary();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, IndexConfig, RankConfig, SearchConfig, UserAgentConfig};
    use tokio::sync::mpsc;

    fn create_test_config(max_depth: u32) -> Config {
        let mut crawler = CrawlerConfig::with_seeds(vec!["https://seed.org/".to_string()]);
        crawler.max_depth = max_depth;
        Config {
            crawler,
            user_agent: UserAgentConfig::default(),
            index: IndexConfig {
                metrics_interval: 0,
                ..IndexConfig::default()
            },
            rank: RankConfig::default(),
            search: SearchConfig::default(),
        }
    }

    fn coordinator(max_depth: u32) -> Coordinator {
        let index = SqliteIndex::in_memory().unwrap();
        Coordinator::new(create_test_config(max_depth), index, StopHandle::new()).unwrap()
    }

    fn page(url: &str, depth: u32, body: &str) -> FetchedPage {
        FetchedPage {
            url: url.to_string(),
            depth,
            body: body.to_string(),
        }
    }

    const BODY: &str = r#"<p>first page</p>
        <a href="https://a.org/">to a</a>
        <a href="https://a.org">again a</a>
        <a href="https://b.org/x">to b</a>"#;

    #[test]
    fn test_seed_frontier_canonicalizes_and_dedups() {
        let mut config = create_test_config(1);
        config.crawler.seeds = vec![
            "https://seed.org/".to_string(),
            "https://seed.org".to_string(),
            "https://other.org/".to_string(),
        ];
        let index = SqliteIndex::in_memory().unwrap();
        let mut coordinator = Coordinator::new(config, index, StopHandle::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        coordinator.seed_frontier(&tx).unwrap();

        assert_eq!(rx.try_recv().unwrap().url, "https://seed.org");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.url, "https://other.org");
        assert_eq!(second.depth, 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_process_page_indexes_and_queues_links() {
        let mut coordinator = coordinator(1);
        let (frontier_tx, mut frontier_rx) = mpsc::unbounded_channel();
        let (failed_tx, mut failed_rx) = mpsc::unbounded_channel();

        coordinator.process_page(page("https://seed.org", 0, BODY), Some(&frontier_tx), &failed_tx);

        let queued: Vec<FrontierEntry> = std::iter::from_fn(|| frontier_rx.try_recv().ok()).collect();
        assert_eq!(
            queued,
            vec![
                FrontierEntry {
                    url: "https://a.org".to_string(),
                    depth: 1
                },
                FrontierEntry {
                    url: "https://b.org/x".to_string(),
                    depth: 1
                },
            ]
        );
        assert!(failed_rx.try_recv().is_err());

        let counts = coordinator.index().table_counts().unwrap();
        assert_eq!(counts.url_list, 3);
        assert_eq!(counts.link_between_url, 2);
        assert_eq!(coordinator.pages_processed, 1);
    }

    #[test]
    fn test_links_beyond_max_depth_are_not_queued() {
        let mut coordinator = coordinator(1);
        let (frontier_tx, mut frontier_rx) = mpsc::unbounded_channel();
        let (failed_tx, _failed_rx) = mpsc::unbounded_channel();

        coordinator.process_page(page("https://a.org", 1, BODY), Some(&frontier_tx), &failed_tx);

        assert!(frontier_rx.try_recv().is_err());
        assert_eq!(coordinator.index().table_counts().unwrap().link_between_url, 2);
    }

    #[test]
    fn test_already_crawled_page_is_skipped() {
        let mut coordinator = coordinator(0);
        let (frontier_tx, _frontier_rx) = mpsc::unbounded_channel();
        let (failed_tx, _failed_rx) = mpsc::unbounded_channel();

        coordinator.process_page(page("https://seed.org", 0, BODY), Some(&frontier_tx), &failed_tx);
        coordinator.process_page(page("https://seed.org", 0, BODY), Some(&frontier_tx), &failed_tx);

        assert_eq!(coordinator.pages_processed, 1);
        assert_eq!(coordinator.index().table_counts().unwrap().link_between_url, 2);
    }

    #[test]
    fn test_stop_prevents_following_links() {
        let mut coordinator = coordinator(2);
        coordinator.stop.stop();
        let (frontier_tx, mut frontier_rx) = mpsc::unbounded_channel();
        let (failed_tx, _failed_rx) = mpsc::unbounded_channel();

        coordinator.process_page(page("https://seed.org", 0, BODY), Some(&frontier_tx), &failed_tx);

        assert!(frontier_rx.try_recv().is_err());
        assert_eq!(coordinator.pages_processed, 1);
    }

    #[test]
    fn test_index_fault_fails_page_and_keeps_earlier_steps() {
        let mut coordinator = coordinator(1);
        coordinator
            .index()
            .connection()
            .execute_batch(
                "CREATE TRIGGER reject_broken BEFORE INSERT ON word_location
                 WHEN (SELECT url FROM url_list WHERE id = NEW.url_id) = 'https://broken.org'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        let (frontier_tx, mut frontier_rx) = mpsc::unbounded_channel();
        let (failed_tx, mut failed_rx) = mpsc::unbounded_channel();

        coordinator.process_page(page("https://broken.org", 0, BODY), Some(&frontier_tx), &failed_tx);

        assert_eq!(failed_rx.try_recv().unwrap(), "https://broken.org");
        assert!(frontier_rx.try_recv().is_err());
        assert_eq!(coordinator.pages_processed, 0);

        // Steps before the word locations stay committed
        let counts = coordinator.index().table_counts().unwrap();
        assert_eq!(counts.url_list, 3);
        assert_eq!(counts.link_between_url, 2);
        assert!(counts.word_list > 0);
        assert_eq!(counts.word_location, 0);
        assert_eq!(counts.link_word, 0);

        coordinator.process_page(page("https://seed.org", 0, BODY), Some(&frontier_tx), &failed_tx);

        assert!(failed_rx.try_recv().is_err());
        assert_eq!(coordinator.pages_processed, 1);
        let counts = coordinator.index().table_counts().unwrap();
        assert!(counts.word_location > 0);
        assert!(counts.link_word > 0);
        assert_eq!(counts.link_between_url, 4);
    }

    #[test]
    fn test_closed_frontier_records_failed_links() {
        let mut coordinator = coordinator(1);
        let (frontier_tx, frontier_rx) = mpsc::unbounded_channel();
        drop(frontier_rx);
        let (failed_tx, mut failed_rx) = mpsc::unbounded_channel();

        coordinator.process_page(page("https://seed.org", 0, BODY), Some(&frontier_tx), &failed_tx);

        assert_eq!(failed_rx.try_recv().unwrap(), "https://a.org");
        assert_eq!(failed_rx.try_recv().unwrap(), "https://b.org/x");
    }
}
