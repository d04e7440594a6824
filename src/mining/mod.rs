//! Frequent itemset and association rule mining (FP-Growth).
//!
//! # Algorithm
//!
//! 1. Count per-item support and drop items below the threshold
//! 2. Rank surviving items by descending support (ties by identifier)
//! 3. Insert every transaction, reordered by rank, into an FP-tree
//! 4. Grow patterns from conditional trees, least frequent item first
//! 5. Derive `A => I - A` rules from every itemset of two or more items
//!
//! # Example
//!
//! ```
//! use mixtape::domain::Transaction;
//! use mixtape::mining::{mine, MiningParams};
//!
//! let transactions = vec![
//!     Transaction::from_items(["A", "B"]),
//!     Transaction::from_items(["A", "B", "C"]),
//!     Transaction::from_items(["A", "B"]),
//!     Transaction::from_items(["B", "C"]),
//! ];
//!
//! let output = mine(transactions, &MiningParams::new(0.5, 0.5)).unwrap();
//! for rule in &output.rules {
//!     println!("{:?} => {:?} (conf={:.2}, lift={:.2})",
//!         rule.antecedent, rule.consequent, rule.confidence, rule.lift);
//! }
//! ```

mod fptree;
mod growth;
mod rules;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::{AssociationRule, FrequentItemset, Item, Transaction};
use crate::error::MiningError;
use fptree::{FpTree, Rank};

/// Default minimum support ratio.
pub const DEFAULT_MIN_SUPPORT: f64 = 0.03;
/// Default minimum confidence.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Mining thresholds, both ratios in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningParams {
    pub min_support: f64,
    pub min_confidence: f64,
}

impl MiningParams {
    #[must_use]
    pub const fn new(min_support: f64, min_confidence: f64) -> Self {
        Self {
            min_support,
            min_confidence,
        }
    }

    pub fn validate(&self) -> Result<(), MiningError> {
        for (field, value) in [
            ("min_support", self.min_support),
            ("min_confidence", self.min_confidence),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(MiningError::ThresholdOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Smallest absolute count with `count >= min_support * transactions`.
    pub fn min_count(&self, transactions: usize) -> u64 {
        let exact = self.min_support * transactions as f64;
        // Absorb float noise such as 0.1 * 30 = 3.0000000000000004.
        ((exact - 1e-9).ceil() as u64).max(1)
    }
}

impl Default for MiningParams {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SUPPORT, DEFAULT_MIN_CONFIDENCE)
    }
}

/// Frequent itemsets and rules of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiningOutput {
    /// Sorted by length, then count descending, then items.
    pub itemsets: Vec<FrequentItemset>,
    /// Sorted by confidence desc, lift desc, antecedent, consequent.
    pub rules: Vec<AssociationRule>,
    pub transaction_count: u64,
}

impl MiningOutput {
    /// True when nothing cleared the support bar.
    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }
}

/// Mine `transactions` for frequent itemsets and association rules.
///
/// An empty collection, or one where no item is frequent, yields an empty
/// output rather than an error.
pub fn mine(
    transactions: Vec<Transaction>,
    params: &MiningParams,
) -> Result<MiningOutput, MiningError> {
    params.validate()?;

    let transaction_count = transactions.len() as u64;
    if transactions.is_empty() {
        info!("no transactions to mine");
        return Ok(MiningOutput::default());
    }

    let mut item_counts: HashMap<&Item, u64> = HashMap::new();
    for (position, transaction) in transactions.iter().enumerate() {
        for item in transaction.items() {
            if item.is_empty() {
                return Err(MiningError::EmptyItem {
                    transaction: position,
                });
            }
            *item_counts.entry(item).or_insert(0) += 1;
        }
    }

    let min_count = params.min_count(transactions.len());
    let mut frequent: Vec<(&Item, u64)> = item_counts
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .collect();
    frequent.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
    debug!(
        frequent_items = frequent.len(),
        min_count, "support threshold applied"
    );

    if frequent.is_empty() {
        info!(
            min_support = params.min_support,
            transactions = transaction_count,
            "no frequent itemsets found"
        );
        return Ok(MiningOutput {
            transaction_count,
            ..MiningOutput::default()
        });
    }

    let rank_of: HashMap<&Item, Rank> = frequent
        .iter()
        .enumerate()
        .map(|(rank, (item, _))| (*item, rank as Rank))
        .collect();
    let items_by_rank: Vec<Item> = frequent.iter().map(|(item, _)| (*item).clone()).collect();

    let mut tree = FpTree::new();
    let mut path: Vec<Rank> = Vec::new();
    for transaction in &transactions {
        path.clear();
        path.extend(transaction.items().iter().filter_map(|item| rank_of.get(item).copied()));
        if path.is_empty() {
            continue;
        }
        path.sort_unstable();
        tree.insert(&path, 1);
    }

    let patterns = growth::grow(tree, min_count)?;
    let rules = rules::derive(
        &patterns,
        &items_by_rank,
        transaction_count,
        params.min_confidence,
    )?;

    let mut itemsets: Vec<FrequentItemset> = patterns
        .into_iter()
        .map(|pattern| {
            let items = pattern
                .ranks
                .iter()
                .map(|&rank| items_by_rank[rank as usize].clone())
                .collect();
            FrequentItemset::new(items, pattern.count, transaction_count)
        })
        .collect();
    itemsets.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.items.cmp(&b.items))
    });

    info!(
        transactions = transaction_count,
        itemsets = itemsets.len(),
        rules = rules.len(),
        "mining complete"
    );

    Ok(MiningOutput {
        itemsets,
        rules,
        transaction_count,
    })
}
