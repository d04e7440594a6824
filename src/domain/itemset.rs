//! Frequent itemsets.

use serde::{Deserialize, Serialize};

use super::item::Item;

/// An item combination whose support met the mining threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentItemset {
    /// Items in ascending identifier order.
    pub items: Vec<Item>,
    /// Number of transactions containing every item.
    pub count: u64,
    /// `count / transaction_count`.
    pub support: f64,
}

impl FrequentItemset {
    /// Create an itemset, normalizing item order.
    pub fn new(mut items: Vec<Item>, count: u64, transaction_count: u64) -> Self {
        items.sort();
        let support = if transaction_count == 0 {
            0.0
        } else {
            count as f64 / transaction_count as f64
        };
        Self {
            items,
            count,
            support,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
