//! Page authority ranking
//!
//! Ranks are computed offline over the whole link graph with a fixed number of
//! Jacobi-style iterations: every rank of an iteration is derived from the
//! ratios of the previous one, and ratios are refreshed only after all ranks
//! are known.
//!
//! ```text
//! rank(p)  = (1 - d) + d * sum(ratio(q) for every edge q -> p)
//! ratio(p) = rank(p) / outdegree(p)      (rank(p) when p has no outgoing edge)
//! ```

mod graph;

pub use graph::LinkGraph;

use crate::config::RankConfig;
use crate::storage::{IndexStore, SqliteIndex, StorageResult};
use std::time::Instant;

/// Rank state of one URL after a ranking pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankEntry {
    pub url_id: i64,
    pub rank: f64,
    /// Share of the rank passed along each outgoing edge
    pub ratio: f64,
}

/// Fixed-iteration PageRank calculator
#[derive(Debug, Clone)]
pub struct PageRanker {
    iterations: u32,
    damping: f64,
}

impl PageRanker {
    pub fn new(config: &RankConfig) -> Self {
        Self {
            iterations: config.iterations,
            damping: config.damping,
        }
    }

    /// Computes ranks for every node of the graph
    ///
    /// Entries are returned in ascending url id order.
    pub fn compute(&self, graph: &LinkGraph) -> Vec<PageRankEntry> {
        self.compute_from(graph, 1.0)
    }

    /// Same as [`compute`](Self::compute) with every rank starting at `initial`
    pub(crate) fn compute_from(&self, graph: &LinkGraph, initial: f64) -> Vec<PageRankEntry> {
        let n = graph.len();
        let mut ranks = vec![initial; n];
        let mut ratios: Vec<f64> = (0..n)
            .map(|node| match graph.outdegree_at(node) {
                0 => initial,
                out => initial / out as f64,
            })
            .collect();

        for _ in 0..self.iterations {
            for (node, rank) in ranks.iter_mut().enumerate() {
                let inbound: f64 = graph.inbound_at(node).iter().map(|&q| ratios[q]).sum();
                *rank = (1.0 - self.damping) + self.damping * inbound;
            }

            for (node, ratio) in ratios.iter_mut().enumerate() {
                *ratio = match graph.outdegree_at(node) {
                    0 => ranks[node],
                    out => ranks[node] / out as f64,
                };
            }
        }

        graph
            .node_ids()
            .iter()
            .zip(ranks.iter().zip(ratios.iter()))
            .map(|(&url_id, (&rank, &ratio))| PageRankEntry {
                url_id,
                rank,
                ratio,
            })
            .collect()
    }

    /// Computes ranks from the index link graph and replaces the rank table
    pub fn rank_store<S: IndexStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> StorageResult<Vec<PageRankEntry>> {
        let graph = LinkGraph::from_store(&*store)?;
        tracing::info!(
            "Calculating page ranks for {} URLs over {} iterations",
            graph.len(),
            self.iterations
        );

        let entries = self.compute(&graph);
        let pairs: Vec<(i64, f64)> = entries.iter().map(|e| (e.url_id, e.rank)).collect();
        store.replace_page_ranks(&pairs)?;

        Ok(entries)
    }

    /// Ranks the index and writes the snapshot to disk
    pub fn rank_index(&self, index: &mut SqliteIndex) -> crate::Result<Vec<PageRankEntry>> {
        let start = Instant::now();
        let entries = self.rank_store(index)?;
        index.save()?;

        tracing::info!(
            "Page ranks calculated for {} URLs in {:.2?}",
            entries.len(),
            start.elapsed()
        );
        Ok(entries)
    }
}
