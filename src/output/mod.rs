//! Output module for index reports
//!
//! This module handles:
//! - Loading and printing index statistics
//! - The periodic CSV metrics log written while crawling
//! - Rendering search results for the terminal

mod metrics;
mod results;
pub mod stats;

pub use metrics::{MetricsLog, METRICS_HEADER};
pub use results::{format_result, print_search_results};
pub use stats::{load_statistics, print_statistics, IndexStatistics};
