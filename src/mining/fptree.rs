//! Arena-allocated FP-tree.
//!
//! Nodes live in a `Vec` and refer to each other by index. Items are
//! represented by their global rank (0 = most frequent), so a transaction's
//! path is its ranks in ascending order.

use std::collections::{BTreeMap, HashMap};

pub(crate) type Rank = u32;

const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct Node {
    rank: Rank,
    count: u64,
    parent: usize,
    children: HashMap<Rank, usize>,
}

impl Node {
    fn new(rank: Rank, parent: usize) -> Self {
        Self {
            rank,
            count: 0,
            parent,
            children: HashMap::new(),
        }
    }
}

/// Total count and node list for one item.
#[derive(Debug, Clone, Default)]
struct HeaderEntry {
    count: u64,
    nodes: Vec<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct FpTree {
    nodes: Vec<Node>,
    header: BTreeMap<Rank, HeaderEntry>,
}

impl FpTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new(Rank::MAX, ROOT)],
            header: BTreeMap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Insert a path of ranks (ascending) carrying `count` transactions.
    pub(crate) fn insert(&mut self, path: &[Rank], count: u64) {
        let mut node_idx = ROOT;
        for &rank in path {
            let next_idx = if let Some(&idx) = self.nodes[node_idx].children.get(&rank) {
                idx
            } else {
                let idx = self.nodes.len();
                self.nodes.push(Node::new(rank, node_idx));
                self.nodes[node_idx].children.insert(rank, idx);
                self.header.entry(rank).or_default().nodes.push(idx);
                idx
            };
            self.nodes[next_idx].count += count;
            self.header.entry(rank).or_default().count += count;
            node_idx = next_idx;
        }
    }

    /// Items with their total count, least frequent first.
    pub(crate) fn items_by_ascending_support(&self) -> Vec<(Rank, u64)> {
        self.header
            .iter()
            .rev()
            .map(|(&rank, entry)| (rank, entry.count))
            .collect()
    }

    /// True when no node has more than one child.
    pub(crate) fn is_single_path(&self) -> bool {
        self.nodes.iter().all(|node| node.children.len() <= 1)
    }

    /// Nodes of a single-path tree from the root down, as `(rank, count)`.
    pub(crate) fn single_path(&self) -> Vec<(Rank, u64)> {
        let mut path = Vec::new();
        let mut node = &self.nodes[ROOT];
        while let Some(&child) = node.children.values().next() {
            node = &self.nodes[child];
            path.push((node.rank, node.count));
        }
        path
    }

    /// Conditional pattern base of `rank`: every prefix path leading to one
    /// of its nodes, weighted by that node's count.
    fn prefix_paths(&self, rank: Rank) -> Vec<(Vec<Rank>, u64)> {
        let Some(entry) = self.header.get(&rank) else {
            return Vec::new();
        };
        entry
            .nodes
            .iter()
            .filter_map(|&idx| {
                let count = self.nodes[idx].count;
                let mut path = Vec::new();
                let mut cursor = self.nodes[idx].parent;
                while cursor != ROOT {
                    path.push(self.nodes[cursor].rank);
                    cursor = self.nodes[cursor].parent;
                }
                if path.is_empty() {
                    return None;
                }
                path.reverse();
                Some((path, count))
            })
            .collect()
    }

    /// Build the conditional tree of `rank`, keeping only items whose count
    /// within the pattern base reaches `min_count`.
    pub(crate) fn conditional(&self, rank: Rank, min_count: u64) -> FpTree {
        let base = self.prefix_paths(rank);

        let mut counts: HashMap<Rank, u64> = HashMap::new();
        for (path, count) in &base {
            for r in path {
                *counts.entry(*r).or_insert(0) += count;
            }
        }

        let mut tree = FpTree::new();
        for (path, count) in base {
            let kept: Vec<Rank> = path
                .into_iter()
                .filter(|r| counts.get(r).is_some_and(|c| *c >= min_count))
                .collect();
            if !kept.is_empty() {
                tree.insert(&kept, count);
            }
        }
        tree
    }
}
