//! Association rule derivation from frequent patterns.

use std::collections::HashMap;

use super::fptree::Rank;
use super::growth::Pattern;
use crate::domain::{AssociationRule, Item};
use crate::error::MiningError;

/// Derive every rule `A => I - A` with confidence at least `min_confidence`.
///
/// `patterns` must be closed under subsets, which FP-Growth guarantees; a
/// missing subset is reported as an invariant violation. Pattern length is
/// bounded by growth, so every antecedent fits a `u64` mask.
pub(crate) fn derive(
    patterns: &[Pattern],
    items_by_rank: &[Item],
    transaction_count: u64,
    min_confidence: f64,
) -> Result<Vec<AssociationRule>, MiningError> {
    let n = transaction_count as f64;
    let support: HashMap<Vec<Rank>, u64> = patterns
        .iter()
        .map(|p| (canonical(&p.ranks), p.count))
        .collect();
    let lookup = |ranks: &[Rank]| {
        support.get(ranks).copied().ok_or_else(|| {
            MiningError::Invariant(format!("subset {ranks:?} missing from frequent itemsets"))
        })
    };

    let mut rules = Vec::new();
    for pattern in patterns.iter().filter(|p| p.ranks.len() >= 2) {
        let ranks = canonical(&pattern.ranks);
        let full: u64 = (1u64 << ranks.len()) - 1;
        for mask in 1..full {
            let (antecedent, consequent) = split(&ranks, mask);
            let confidence = pattern.count as f64 / lookup(&antecedent)? as f64;
            if confidence < min_confidence {
                continue;
            }
            let consequent_support = lookup(&consequent)? as f64 / n;
            rules.push(AssociationRule {
                antecedent: to_items(&antecedent, items_by_rank),
                consequent: to_items(&consequent, items_by_rank),
                support: pattern.count as f64 / n,
                confidence,
                lift: confidence / consequent_support,
            });
        }
    }

    rules.sort_by(AssociationRule::ranking);
    Ok(rules)
}

fn canonical(ranks: &[Rank]) -> Vec<Rank> {
    let mut ranks = ranks.to_vec();
    ranks.sort_unstable();
    ranks
}

fn split(ranks: &[Rank], mask: u64) -> (Vec<Rank>, Vec<Rank>) {
    let mut inside = Vec::new();
    let mut outside = Vec::new();
    for (bit, &rank) in ranks.iter().enumerate() {
        if mask & (1 << bit) != 0 {
            inside.push(rank);
        } else {
            outside.push(rank);
        }
    }
    (inside, outside)
}

fn to_items(ranks: &[Rank], items_by_rank: &[Item]) -> Vec<Item> {
    let mut items: Vec<Item> = ranks
        .iter()
        .map(|&rank| items_by_rank[rank as usize].clone())
        .collect();
    items.sort();
    items
}
