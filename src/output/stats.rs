//! Statistics generation from the index
//!
//! This module provides functionality for extracting and displaying
//! index statistics from the storage layer.

use crate::storage::{IndexStore, TableCounts};
use crate::SeekError;

/// Index statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStatistics {
    /// Row count of every index table
    pub counts: TableCounts,

    /// Number of distinct words
    pub unique_words: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The index to query
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(SeekError)` - Failed to query statistics
pub fn load_statistics(store: &dyn IndexStore) -> Result<IndexStatistics, SeekError> {
    Ok(IndexStatistics {
        counts: store.table_counts()?,
        unique_words: store.count_unique_words()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &IndexStatistics) {
    let counts = &stats.counts;

    println!("=== Index Statistics ===\n");

    println!("Tables:");
    println!("  url_list:         {}", counts.url_list);
    println!("  word_list:        {}", counts.word_list);
    println!("  word_location:    {}", counts.word_location);
    println!("  link_between_url: {}", counts.link_between_url);
    println!("  link_word:        {}", counts.link_word);
    println!("  page_rank:        {}", counts.page_rank);
    println!();

    println!("Overview:");
    println!("  Unique words: {}", stats.unique_words);
    println!("  Total rows: {}", counts.total_rows());

    if counts.page_rank == 0 {
        println!("  Page ranks: not computed (run `rank` before searching)");
    } else {
        let coverage = (counts.page_rank as f64 / counts.url_list.max(1) as f64) * 100.0;
        println!(
            "  Page ranks: {} ({:.1}% of known URLs)",
            counts.page_rank, coverage
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteIndex;
    use crate::Element;

    #[test]
    fn test_load_statistics_empty() {
        let index = SqliteIndex::in_memory().unwrap();
        let stats = load_statistics(&index).unwrap();
        assert_eq!(stats, IndexStatistics::default());
    }

    #[test]
    fn test_load_statistics_counts_rows() {
        let mut index = SqliteIndex::in_memory().unwrap();
        let url_id = index.insert_url("https://a.org").unwrap();
        let mut elements = vec![
            Element::new("hello", 0, None),
            Element::new("world", 1, None),
            Element::new("hello", 2, None),
        ];
        index.insert_words_from_elements(&mut elements).unwrap();
        index.fill_word_locations(&elements, url_id).unwrap();

        let stats = load_statistics(&index).unwrap();
        assert_eq!(stats.counts.url_list, 1);
        assert_eq!(stats.counts.word_list, 2);
        assert_eq!(stats.counts.word_location, 3);
        assert_eq!(stats.unique_words, 2);
    }
}
