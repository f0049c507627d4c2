//! Crawler module for web page fetching and indexing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - The frontier and completed-page channels shared by both crawl contexts
//! - Overall crawl coordination and indexing of fetched pages

mod context;
mod coordinator;
mod fetcher;

pub use context::{
    CrawlContext, CrawlProgress, CrawlReport, FetchedPage, FrontierEntry, IdlePolicy, StopHandle,
};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, fetch_url, fetch_with_retry, user_agent_string, FetchFault, FetchResult,
    FetchWorker, RetryPolicy,
};

use crate::config::Config;
use crate::SeekError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the index snapshot
/// 2. Build the HTTP client
/// 3. Fetch pages in concurrent batches
/// 4. Index pages and follow links up to the configured depth
/// 5. Save the snapshot and log a summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `stop` - Set it to end the crawl early
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed (possibly stopped)
/// * `Err(SeekError)` - Crawl failed
pub async fn crawl(config: Config, stop: StopHandle) -> Result<CrawlReport, SeekError> {
    run_crawl(config, stop).await
}
