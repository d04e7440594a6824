//! Brute-force reference computations over small transaction sets.

use std::collections::BTreeSet;

use mixtape::domain::{Item, Transaction};

/// Number of transactions containing every item of `itemset`.
pub fn support_count(transactions: &[Transaction], itemset: &[Item]) -> u64 {
    transactions
        .iter()
        .filter(|tx| itemset.iter().all(|item| tx.contains(item)))
        .count() as u64
}

/// Every distinct item, ascending.
pub fn alphabet(transactions: &[Transaction]) -> Vec<Item> {
    transactions
        .iter()
        .flat_map(|tx| tx.items().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// All non-empty subsets of `items` (at most 2^12 of them).
pub fn subsets(items: &[Item]) -> Vec<Vec<Item>> {
    assert!(items.len() <= 12, "too many items for brute force");
    (1u32..(1 << items.len()))
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, item)| item.clone())
                .collect()
        })
        .collect()
}
