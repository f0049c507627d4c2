//! Storage module for the search index
//!
//! This module handles all database operations, including:
//! - SQLite schema management for the six index tables
//! - Restoring the in-memory index from a snapshot file and saving it back
//! - Batch id assignment for URLs and words
//! - Link graph and page rank persistence

mod schema;
mod sqlite;
pub mod stopwords;
mod traits;

pub use schema::TABLES;
pub use sqlite::SqliteIndex;
pub use stopwords::is_stopword;
pub use traits::{IndexStore, StorageError, StorageResult};

use crate::SeekError;
use std::path::Path;

/// Opens the index stored at `path`, creating a fresh one if absent
///
/// # Returns
///
/// * `Ok(SqliteIndex)` - In-memory index restored from the snapshot
/// * `Err(SeekError)` - Failed to restore the snapshot
pub fn open_index(path: &Path) -> Result<SqliteIndex, SeekError> {
    Ok(SqliteIndex::open(path)?)
}

/// One row of the multi-word location join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCombination {
    pub url_id: i64,
    pub positions: Vec<i64>,
}

/// Row counts of the index tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub url_list: u64,
    pub word_list: u64,
    pub word_location: u64,
    pub link_between_url: u64,
    pub link_word: u64,
    pub page_rank: u64,
}

impl TableCounts {
    pub fn total_rows(&self) -> u64 {
        self.url_list
            + self.word_list
            + self.word_location
            + self.link_between_url
            + self.link_word
            + self.page_rank
    }
}
