//! Shared crawl state
//!
//! The fetch task and the processing loop only talk through the channels and
//! counters defined here. The processing loop is the single writer of the
//! index; the fetch task never touches it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    /// Link distance from the nearest seed
    pub depth: u32,
}

/// A successfully fetched page waiting to be indexed
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The frontier URL, not the post-redirect one
    pub url: String,
    pub depth: u32,
    pub body: String,
}

/// Cooperative cancellation flag shared by both crawl contexts
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the crawl to stop at the next loop iteration
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Work counters that keep either loop from going idle too early
#[derive(Debug, Default)]
pub struct CrawlProgress {
    /// Pages sent to the processing loop and not yet finished there
    pending: AtomicUsize,
    /// URLs currently being fetched
    in_flight: AtomicUsize,
}

impl CrawlProgress {
    pub fn page_sent(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    pub fn page_done(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn fetches_started(&self, count: usize) {
        self.in_flight.fetch_add(count, Ordering::SeqCst);
    }

    pub fn fetches_finished(&self, count: usize) {
        self.in_flight.fetch_sub(count, Ordering::SeqCst);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Idle exit policy shared by the fetch and processing loops
#[derive(Debug, Clone, Copy)]
pub struct IdlePolicy {
    pub poll_interval: Duration,
    pub polls_before_exit: u32,
}

/// Fetch-side ends of the crawl channels
pub struct FetchChannels {
    pub frontier: UnboundedReceiver<FrontierEntry>,
    pub pages: UnboundedSender<FetchedPage>,
    pub failed: UnboundedSender<String>,
}

/// Processing-side ends of the crawl channels
pub struct ProcessChannels {
    pub frontier: UnboundedSender<FrontierEntry>,
    pub pages: UnboundedReceiver<FetchedPage>,
    pub failed_tx: UnboundedSender<String>,
    pub failed_rx: UnboundedReceiver<String>,
}

/// Everything one crawl run shares between its two contexts
pub struct CrawlContext {
    pub stop: StopHandle,
    pub progress: Arc<CrawlProgress>,
    pub fetch: FetchChannels,
    pub process: ProcessChannels,
}

impl CrawlContext {
    pub fn new(stop: StopHandle) -> Self {
        let (frontier_tx, frontier_rx) = mpsc::unbounded_channel();
        let (pages_tx, pages_rx) = mpsc::unbounded_channel();
        let (failed_tx, failed_rx) = mpsc::unbounded_channel();

        Self {
            stop,
            progress: Arc::new(CrawlProgress::default()),
            fetch: FetchChannels {
                frontier: frontier_rx,
                pages: pages_tx,
                failed: failed_tx.clone(),
            },
            process: ProcessChannels {
                frontier: frontier_tx,
                pages: pages_rx,
                failed_tx,
                failed_rx,
            },
        }
    }
}

/// Outcome of a crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Pages indexed during this run
    pub pages_crawled: u64,
    /// URLs abandoned by the fetcher, failed during indexing or drained on stop
    pub failed_urls: Vec<String>,
    pub elapsed: Duration,
    /// Whether the run ended through the stop flag
    pub stopped: bool,
}

impl CrawlReport {
    /// Logs the end-of-run summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Crawl finished: {} pages crawled in {:.2} minutes{}",
            self.pages_crawled,
            self.elapsed.as_secs_f64() / 60.0,
            if self.stopped { " (stopped)" } else { "" }
        );

        if self.failed_urls.is_empty() {
            return;
        }

        tracing::warn!("{} URLs failed", self.failed_urls.len());
        for url in self.failed_sample() {
            tracing::warn!("  failed: {}", url);
        }
    }

    /// First three and last three failed URLs
    pub fn failed_sample(&self) -> Vec<&str> {
        let failed = &self.failed_urls;
        if failed.len() <= 6 {
            return failed.iter().map(String::as_str).collect();
        }
        failed[..3]
            .iter()
            .chain(failed[failed.len() - 3..].iter())
            .map(String::as_str)
            .collect()
    }
}
