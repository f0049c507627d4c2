//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - Retry logic for transient failures
//! - Error classification
//! - The fetch loop that drains the frontier in concurrent batches

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::context::{
    CrawlProgress, FetchChannels, FetchedPage, FrontierEntry, IdlePolicy, StopHandle,
};
use futures::future::join_all;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;

/// Maximum redirect hops before a fetch is abandoned
const MAX_REDIRECTS: usize = 10;

/// Why a fetch attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFault {
    /// Timeout or connection failure; worth retrying
    Transient(String),

    /// Redirect loop or too many redirects
    Redirect(String),

    /// Response body could not be decoded
    Decode(String),

    /// Non-success HTTP status
    Status(u16),

    /// Anything else
    Other(String),
}

impl FetchFault {
    /// Classifies a reqwest error
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            FetchFault::Transient(err.to_string())
        } else if err.is_redirect() {
            FetchFault::Redirect(err.to_string())
        } else if err.is_decode() {
            FetchFault::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFault::Status(status.as_u16())
        } else {
            FetchFault::Other(err.to_string())
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchFault::Transient(_))
    }
}

impl fmt::Display for FetchFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFault::Transient(e) => write!(f, "transient network error: {}", e),
            FetchFault::Redirect(e) => write!(f, "redirect error: {}", e),
            FetchFault::Decode(e) => write!(f, "decode error: {}", e),
            FetchFault::Status(code) => write!(f, "HTTP {}", code),
            FetchFault::Other(e) => write!(f, "{}", e),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The URL was abandoned
    Failed {
        fault: FetchFault,
        /// Attempts made, including the first
        attempts: u32,
    },
}

/// Retry settings for transient faults
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed sleep between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }
}

/// Formats the crawler user agent: `Name/Version (+ContactURL)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Crawler tunables (connect and total timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_seek::config::{CrawlerConfig, UserAgentConfig};
/// use sumi_seek::crawler::build_http_client;
///
/// let crawler = CrawlerConfig::with_seeds(vec!["https://ngs.ru".to_string()]);
/// let client = build_http_client(&UserAgentConfig::default(), &crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .connect_timeout(crawler.connect_timeout())
        .timeout(crawler.total_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Makes a single GET attempt
///
/// Any non-success status is reported as [`FetchFault::Status`].
pub async fn fetch_url(client: &Client, url: &str) -> Result<(String, u16, String), FetchFault> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchFault::classify(&e))?;

    let response = response
        .error_for_status()
        .map_err(|e| FetchFault::classify(&e))?;

    let final_url = response.url().to_string();
    let status_code = response.status().as_u16();
    let body = response.text().await.map_err(|e| FetchFault::classify(&e))?;

    Ok((final_url, status_code, body))
}

/// Fetches a URL, retrying transient faults with a fixed backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Timeout / connection error | Retry up to `max_retries` times |
/// | Redirect loop or > 10 hops | Abandon |
/// | Decode error | Abandon |
/// | Non-success HTTP status | Abandon |
/// | Anything else | Abandon |
pub async fn fetch_with_retry(client: &Client, url: &str, policy: &RetryPolicy) -> FetchResult {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match fetch_url(client, url).await {
            Ok((final_url, status_code, body)) => {
                tracing::debug!("Fetched {} ({}, {} bytes)", url, status_code, body.len());
                return FetchResult::Success {
                    final_url,
                    status_code,
                    body,
                };
            }
            Err(fault) if fault.is_retryable() && attempts <= policy.max_retries => {
                tracing::warn!(
                    "Attempt {} for {} failed: {}; retrying in {:?}",
                    attempts,
                    url,
                    fault,
                    policy.backoff
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(fault) => return FetchResult::Failed { fault, attempts },
        }
    }
}

/// The fetch side of a crawl, run as its own task
pub struct FetchWorker {
    pub client: Client,
    pub channels: FetchChannels,
    pub stop: StopHandle,
    pub progress: Arc<CrawlProgress>,
    pub retry: RetryPolicy,
    pub idle: IdlePolicy,
    pub batch_size: usize,
}

impl FetchWorker {
    /// Drains the frontier in concurrent batches until idle or stopped
    ///
    /// Returns the number of pages handed to the processing loop.
    pub async fn run(mut self) -> u64 {
        let mut fetched = 0;
        let mut idle_polls = 0;

        loop {
            if self.stop.is_stopped() {
                let drained = self.drain_frontier();
                tracing::info!("Stop requested, {} queued URLs moved to failed", drained);
                break;
            }

            let first = match tokio::time::timeout(
                self.idle.poll_interval,
                self.channels.frontier.recv(),
            )
            .await
            {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    tracing::debug!("Frontier closed, fetch loop exiting");
                    break;
                }
                Err(_) => {
                    // Pages still being indexed may enqueue more links
                    if self.progress.pending() > 0 {
                        idle_polls = 0;
                        continue;
                    }
                    idle_polls += 1;
                    tracing::debug!("Frontier empty ({} idle polls)", idle_polls);
                    if idle_polls >= self.idle.polls_before_exit {
                        tracing::info!("Frontier stayed empty, fetch loop exiting");
                        break;
                    }
                    continue;
                }
            };
            idle_polls = 0;

            let mut batch = vec![first];
            while batch.len() < self.batch_size {
                match self.channels.frontier.try_recv() {
                    Ok(entry) => batch.push(entry),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }

            fetched += self.fetch_batch(batch).await;
        }

        fetched
    }

    async fn fetch_batch(&self, batch: Vec<FrontierEntry>) -> u64 {
        let count = batch.len();
        self.progress.fetches_started(count);
        tracing::debug!("Fetching batch of {} URLs", count);

        let client = &self.client;
        let retry = &self.retry;
        let results = join_all(
            batch
                .iter()
                .map(|entry| fetch_with_retry(client, &entry.url, retry)),
        )
        .await;

        let mut sent = 0;
        for (entry, result) in batch.into_iter().zip(results) {
            match result {
                FetchResult::Success { body, .. } if body.trim().is_empty() => {
                    tracing::debug!("Skipping {}: empty body", entry.url);
                }
                FetchResult::Success { body, .. } => {
                    self.progress.page_sent();
                    let page = FetchedPage {
                        url: entry.url,
                        depth: entry.depth,
                        body,
                    };
                    if let Err(rejected) = self.channels.pages.send(page) {
                        self.progress.page_done();
                        let _ = self.channels.failed.send(rejected.0.url);
                    } else {
                        sent += 1;
                    }
                }
                FetchResult::Failed { fault, attempts } => {
                    tracing::error!(
                        "Abandoning {} after {} attempt(s): {}",
                        entry.url,
                        attempts,
                        fault
                    );
                    let _ = self.channels.failed.send(entry.url);
                }
            }
        }

        self.progress.fetches_finished(count);
        sent
    }

    /// Moves every queued URL to the failed list
    fn drain_frontier(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(entry) = self.channels.frontier.try_recv() {
            let _ = self.channels.failed.send(entry.url);
            drained += 1;
        }
        drained
    }
}
