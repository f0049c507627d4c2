//! Query engine
//!
//! A query is answered from two signals:
//! - proximity: how close together all query words appear on a page
//! - authority: the page's stored rank, normalized over the candidate pages
//!
//! Both are scaled to (0, 1] and averaged into the total score.

mod distance;

pub use distance::{distance_scores, location_distance, min_distances};

use crate::storage::IndexStore;
use crate::{Result, SeekError};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Minimum number of distinct query words
pub const MIN_QUERY_TERMS: usize = 2;

/// One ranked page
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub url_id: i64,
    pub url: String,
    pub distance_score: f64,
    pub authority_score: f64,
    pub total_score: f64,
}

/// Splits a query into distinct lower-cased words, keeping first-seen order
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.split_whitespace().map(str::to_lowercase) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Answers queries against an index
pub struct Searcher<'a, S: IndexStore + ?Sized> {
    store: &'a S,
    limit: usize,
}

impl<'a, S: IndexStore + ?Sized> Searcher<'a, S> {
    pub fn new(store: &'a S, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Returns the best pages for a query, highest total score first
    ///
    /// Queries with fewer than two distinct words, or with a word that is not
    /// in the index, return no results. Searching an index that has never been
    /// ranked fails with [`SeekError::RanksNotComputed`].
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let terms = query_terms(query);
        if terms.len() < MIN_QUERY_TERMS {
            tracing::debug!("Query {:?} has fewer than {} words", query, MIN_QUERY_TERMS);
            return Ok(Vec::new());
        }

        if self.store.count_page_ranks()? == 0 {
            return Err(SeekError::RanksNotComputed);
        }

        let combinations = self.store.word_location_combinations(&terms)?;
        let distances = distance_scores(&min_distances(&combinations));
        if distances.is_empty() {
            tracing::info!("No pages contain all of {:?}", terms);
            return Ok(Vec::new());
        }

        let candidates: Vec<i64> = distances.keys().copied().collect();
        let authorities = self.authority_scores(&candidates)?;

        let mut results = Vec::with_capacity(candidates.len());
        for (url_id, distance_score) in distances {
            let authority_score = authorities.get(&url_id).copied().unwrap_or(0.0);
            results.push(SearchResult {
                url_id,
                url: self.store.url_by_id(url_id)?,
                distance_score,
                authority_score,
                total_score: (authority_score + distance_score) / 2.0,
            });
        }

        results.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(Ordering::Equal)
                .then(a.url_id.cmp(&b.url_id))
        });
        results.truncate(self.limit);

        tracing::debug!("Query {:?} matched {} pages", query, candidates.len());
        Ok(results)
    }

    /// Same as [`search`](Self::search), with each page's word list attached
    pub fn search_with_words(&self, query: &str) -> Result<Vec<(SearchResult, Vec<String>)>> {
        self.search(query)?
            .into_iter()
            .map(|result| {
                let words = self.store.page_words(result.url_id)?;
                Ok((result, words))
            })
            .collect()
    }

    /// Ranks of the candidates divided by the largest of them
    fn authority_scores(&self, candidates: &[i64]) -> Result<HashMap<i64, f64>> {
        let ranks = self.store.page_ranks_for(candidates)?;
        let max = ranks.values().copied().fold(0.0_f64, f64::max);

        Ok(ranks
            .into_iter()
            .map(|(url_id, rank)| {
                let score = if max > 0.0 { rank / max } else { 0.0 };
                (url_id, score)
            })
            .collect())
    }
}
