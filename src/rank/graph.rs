//! Link graph snapshot used by the ranking pass

use crate::storage::{IndexStore, StorageResult};
use std::collections::HashMap;

/// Directed link graph over every known URL
///
/// Nodes are kept in ascending url id order. Duplicate edges (a page indexed
/// twice) count towards both outdegree and inbound lists.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    nodes: Vec<i64>,
    index: HashMap<i64, usize>,
    outdegree: Vec<usize>,
    inbound: Vec<Vec<usize>>,
}

impl LinkGraph {
    /// Builds a graph from node ids and (from, to) edges
    ///
    /// Edges touching an unknown node are ignored.
    pub fn new(mut url_ids: Vec<i64>, edges: &[(i64, i64)]) -> Self {
        url_ids.sort_unstable();
        url_ids.dedup();

        let index: HashMap<i64, usize> = url_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        let mut outdegree = vec![0; url_ids.len()];
        let mut inbound = vec![Vec::new(); url_ids.len()];

        for (from, to) in edges {
            match (index.get(from), index.get(to)) {
                (Some(&source), Some(&target)) => {
                    outdegree[source] += 1;
                    inbound[target].push(source);
                }
                _ => {
                    tracing::debug!("Ignoring edge {} -> {} with unknown endpoint", from, to);
                }
            }
        }

        Self {
            nodes: url_ids,
            index,
            outdegree,
            inbound,
        }
    }

    /// Reads every URL id and link edge from the index
    pub fn from_store<S: IndexStore + ?Sized>(store: &S) -> StorageResult<Self> {
        let url_ids = store.all_url_ids()?;
        let edges = store.link_edges()?;
        Ok(Self::new(url_ids, &edges))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Url ids in ascending order
    pub fn node_ids(&self) -> &[i64] {
        &self.nodes
    }

    /// Number of outgoing edges of a URL
    pub fn outdegree(&self, url_id: i64) -> Option<usize> {
        self.index.get(&url_id).map(|&i| self.outdegree[i])
    }

    /// Url ids linking to a URL, one entry per edge
    pub fn inbound(&self, url_id: i64) -> Option<Vec<i64>> {
        self.index
            .get(&url_id)
            .map(|&i| self.inbound[i].iter().map(|&s| self.nodes[s]).collect())
    }

    pub(crate) fn outdegree_at(&self, node: usize) -> usize {
        self.outdegree[node]
    }

    pub(crate) fn inbound_at(&self, node: usize) -> &[usize] {
        &self.inbound[node]
    }
}
