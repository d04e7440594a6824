//! Subset-matching rule index.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{AssociationRule, Item, ModelSnapshot};

/// Lookup structure over the rules of one snapshot.
///
/// Rules are bucketed by the smallest item of their antecedent. A query only
/// inspects the buckets of its own items, since a rule whose smallest
/// antecedent item is absent from the input cannot be satisfied.
#[derive(Debug, Clone)]
pub struct RuleIndex {
    snapshot: Arc<ModelSnapshot>,
    by_first_item: HashMap<Item, Vec<u32>>,
}

impl RuleIndex {
    pub fn build(snapshot: Arc<ModelSnapshot>) -> Self {
        let mut by_first_item: HashMap<Item, Vec<u32>> = HashMap::new();
        for (position, rule) in snapshot.rules().iter().enumerate() {
            if let Some(first) = rule.antecedent.iter().min() {
                by_first_item
                    .entry(first.clone())
                    .or_default()
                    .push(position as u32);
            }
        }
        Self {
            snapshot,
            by_first_item,
        }
    }

    pub fn snapshot(&self) -> &Arc<ModelSnapshot> {
        &self.snapshot
    }

    pub fn rule_count(&self) -> usize {
        self.snapshot.rules().len()
    }

    /// Rules whose antecedent is a subset of `input`, in snapshot order.
    pub fn matching<'a>(&'a self, input: &HashSet<&str>) -> Vec<&'a AssociationRule> {
        let rules = self.snapshot.rules();
        let mut positions: Vec<u32> = input
            .iter()
            .filter_map(|item| self.by_first_item.get(*item))
            .flatten()
            .copied()
            .filter(|&position| {
                rules[position as usize]
                    .antecedent
                    .iter()
                    .all(|item| input.contains(item.as_str()))
            })
            .collect();
        positions.sort_unstable();
        positions
            .into_iter()
            .map(|position| &rules[position as usize])
            .collect()
    }

    /// Up to `max_results` consequent items of the satisfied rules, best rule
    /// first, never repeating an item and never returning an input item.
    pub fn recommend<S: AsRef<str>>(&self, input: &[S], max_results: usize) -> Vec<Item> {
        let input: HashSet<&str> = input.iter().map(AsRef::as_ref).collect();
        let mut seen: HashSet<&Item> = HashSet::new();
        let mut result = Vec::new();
        if max_results == 0 {
            return result;
        }

        for rule in self.matching(&input) {
            for item in &rule.consequent {
                if input.contains(item.as_str()) || !seen.insert(item) {
                    continue;
                }
                result.push(item.clone());
                if result.len() >= max_results {
                    return result;
                }
            }
        }
        result
    }
}
