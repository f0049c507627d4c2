//! Storage traits and error types
//!
//! This module defines the trait interface for index backends and
//! associated error types.

use crate::extractor::Element;
use crate::storage::{LocationCombination, TableCounts};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL not found: {0}")]
    UrlNotFound(i64),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index backend implementations
///
/// The write operations are the per-page batch steps of the processing loop
/// and must be called in this order for a page:
/// `insert_url`, `insert_links_from_elements`, `insert_words_from_elements`,
/// `insert_links_between`, `fill_word_locations`, `fill_link_words`.
/// Each step annotates the elements with the ids the next steps rely on.
pub trait IndexStore {
    // ===== Page Indexing =====

    /// Returns the id of a URL, inserting it on first sight
    fn insert_url(&mut self, url: &str) -> StorageResult<i64>;

    /// Assigns URL ids to every link target and sets `link_id`
    fn insert_links_from_elements(&mut self, elements: &mut [Element]) -> StorageResult<()>;

    /// Assigns word ids to every non-stopword and sets `word_id`
    fn insert_words_from_elements(&mut self, elements: &mut [Element]) -> StorageResult<()>;

    /// Inserts one edge per distinct link target and sets `edge_id`
    ///
    /// Returns the number of edges inserted.
    fn insert_links_between(
        &mut self,
        elements: &mut [Element],
        source_url_id: i64,
    ) -> StorageResult<usize>;

    /// Inserts one location row per element with a word id
    fn fill_word_locations(&mut self, elements: &[Element], url_id: i64) -> StorageResult<usize>;

    /// Inserts one anchor-word row per element with both a word id and an edge id
    fn fill_link_words(&mut self, elements: &[Element]) -> StorageResult<usize>;

    // ===== Lookups =====

    /// Gets the id of a known URL
    fn url_id(&self, url: &str) -> Option<i64>;

    /// Gets the URL string for an id
    fn url_by_id(&self, url_id: i64) -> StorageResult<String>;

    /// Gets the id of a known word
    fn word_id(&self, word: &str) -> Option<i64>;

    /// Gets the words of a page ordered by position
    fn page_words(&self, url_id: i64) -> StorageResult<Vec<String>>;

    /// Gets every url/position combination where all words co-occur on a page
    ///
    /// Combinations are the inner join on url of each word's location rows;
    /// `positions[i]` belongs to `words[i]`. Unknown words yield no rows.
    fn word_location_combinations(&self, words: &[String])
        -> StorageResult<Vec<LocationCombination>>;

    // ===== Link Graph =====

    /// Gets every known URL id in ascending order
    fn all_url_ids(&self) -> StorageResult<Vec<i64>>;

    /// Gets every link edge as (from, to)
    fn link_edges(&self) -> StorageResult<Vec<(i64, i64)>>;

    // ===== Page Rank =====

    /// Deletes all rank rows and inserts the given (url id, rank) pairs
    fn replace_page_ranks(&mut self, ranks: &[(i64, f64)]) -> StorageResult<()>;

    /// Counts rank rows
    fn count_page_ranks(&self) -> StorageResult<u64>;

    /// Gets raw ranks for exactly the given URL ids (ids without a rank are absent)
    fn page_ranks_for(&self, url_ids: &[i64]) -> StorageResult<HashMap<i64, f64>>;

    // ===== Statistics =====

    /// Counts rows per table
    fn table_counts(&self) -> StorageResult<TableCounts>;

    /// Counts distinct words
    fn count_unique_words(&self) -> StorageResult<u64>;
}
