//! Periodic crawl metrics log
//!
//! One CSV row is appended every few processed pages so the growth of the
//! index can be plotted after a crawl.

use crate::output::IndexStatistics;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Column names of the metrics file
pub const METRICS_HEADER: &str =
    "pages_processed,link_between_url,link_word,url_list,word_list,word_location,unique_words";

/// Append-only CSV metrics file
#[derive(Debug)]
pub struct MetricsLog {
    path: PathBuf,
    file: File,
}

impl MetricsLog {
    /// Opens the metrics file for appending, writing the header if it is new
    pub fn open(path: &Path) -> io::Result<Self> {
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if is_new {
            writeln!(file, "{}", METRICS_HEADER)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one sample
    pub fn record(&mut self, pages_processed: u64, stats: &IndexStatistics) -> io::Result<()> {
        let counts = &stats.counts;
        writeln!(
            self.file,
            "{},{},{},{},{},{},{}",
            pages_processed,
            counts.link_between_url,
            counts.link_word,
            counts.url_list,
            counts.word_list,
            counts.word_location,
            stats.unique_words
        )?;
        self.file.flush()
    }
}
