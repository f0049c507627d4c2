use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Seek
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub rank: RankConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// URLs the crawl starts from (depth 0)
    pub seeds: Vec<String>,

    /// Maximum depth to follow links from the seed URLs
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of frontier entries fetched concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retries after the first attempt for timeout/connection faults
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed sleep between retry attempts (milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Connect timeout per request (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Total timeout per request (milliseconds)
    #[serde(default = "default_total_timeout_ms")]
    pub total_timeout_ms: u64,

    /// Sleep between polls of an empty queue (milliseconds)
    #[serde(default = "default_idle_poll_interval_ms")]
    pub idle_poll_interval_ms: u64,

    /// Consecutive empty polls after which a loop exits
    #[serde(default = "default_idle_polls_before_exit")]
    pub idle_polls_before_exit: u32,
}

impl CrawlerConfig {
    /// Builds a crawler configuration with default tunables
    pub fn with_seeds(seeds: Vec<String>) -> Self {
        Self {
            seeds,
            max_depth: default_max_depth(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            total_timeout_ms: default_total_timeout_ms(),
            idle_poll_interval_ms: default_idle_poll_interval_ms(),
            idle_polls_before_exit: default_idle_polls_before_exit(),
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_millis(self.total_timeout_ms)
    }

    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_interval_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiSeek".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/bot".to_string(),
        }
    }
}

/// Index storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexConfig {
    /// Path to the SQLite snapshot file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Path to the CSV metrics log
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Processed pages between metrics samples (0 disables sampling)
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            metrics_path: default_metrics_path(),
            metrics_interval: default_metrics_interval(),
        }
    }
}

/// Rank engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RankConfig {
    /// Number of fixed iterations
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Weight of authority flowing through links
    #[serde(default = "default_damping")]
    pub damping: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            damping: default_damping(),
        }
    }
}

/// Query engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Number of results returned per query
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_batch_size() -> usize {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_total_timeout_ms() -> u64 {
    10_000
}

fn default_idle_poll_interval_ms() -> u64 {
    5_000
}

fn default_idle_polls_before_exit() -> u32 {
    3
}

fn default_database_path() -> String {
    "index.db".to_string()
}

fn default_metrics_path() -> String {
    "statistics.csv".to_string()
}

fn default_metrics_interval() -> u64 {
    2
}

fn default_iterations() -> u32 {
    25
}

fn default_damping() -> f64 {
    0.85
}

fn default_result_limit() -> usize {
    10
}
