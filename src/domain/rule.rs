//! Association rules.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::item::Item;

/// `antecedent => consequent`, with the metrics it was mined with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    /// Items on the left side, ascending.
    pub antecedent: Vec<Item>,
    /// Items on the right side, ascending. Disjoint from `antecedent`.
    pub consequent: Vec<Item>,
    /// Support of `antecedent ∪ consequent`.
    pub support: f64,
    /// `support(antecedent ∪ consequent) / support(antecedent)`.
    pub confidence: f64,
    /// `confidence / support(consequent)`.
    pub lift: f64,
}

impl AssociationRule {
    /// Serving order: confidence desc, lift desc, then antecedent and
    /// consequent ascending so equal-metric rules have a fixed position.
    pub fn ranking(&self, other: &Self) -> Ordering {
        other
            .confidence
            .total_cmp(&self.confidence)
            .then_with(|| other.lift.total_cmp(&self.lift))
            .then_with(|| self.antecedent.cmp(&other.antecedent))
            .then_with(|| self.consequent.cmp(&other.consequent))
    }

    /// Check the structural invariants of a rule read from outside the miner.
    pub fn check(&self) -> Result<(), String> {
        if self.antecedent.is_empty() || self.consequent.is_empty() {
            return Err("rule with empty side".into());
        }
        if self.antecedent.iter().chain(&self.consequent).any(Item::is_empty) {
            return Err("rule with empty item identifier".into());
        }
        if self.antecedent.iter().any(|a| self.consequent.contains(a)) {
            return Err(format!(
                "antecedent and consequent overlap in {:?} => {:?}",
                self.antecedent, self.consequent
            ));
        }
        if !(self.confidence > 0.0 && self.confidence <= 1.0) {
            return Err(format!("confidence {} outside (0, 1]", self.confidence));
        }
        if !self.lift.is_finite() || self.lift < 0.0 {
            return Err(format!("lift {} is not a finite non-negative value", self.lift));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(a: &[&str], c: &[&str], confidence: f64, lift: f64) -> AssociationRule {
        AssociationRule {
            antecedent: a.iter().map(|s| Item::from(*s)).collect(),
            consequent: c.iter().map(|s| Item::from(*s)).collect(),
            support: 0.5,
            confidence,
            lift,
        }
    }

    #[test]
    fn ranking_orders_by_confidence_then_lift() {
        let mut rules = vec![
            rule(&["a"], &["b"], 0.5, 2.0),
            rule(&["c"], &["d"], 0.9, 1.0),
            rule(&["e"], &["f"], 0.9, 1.5),
        ];
        rules.sort_by(AssociationRule::ranking);
        assert_eq!(rules[0].antecedent, vec![Item::from("e")]);
        assert_eq!(rules[1].antecedent, vec![Item::from("c")]);
        assert_eq!(rules[2].antecedent, vec![Item::from("a")]);
    }

    #[test]
    fn ranking_breaks_metric_ties_by_items() {
        let mut rules = vec![rule(&["b"], &["a"], 1.0, 1.0), rule(&["a"], &["b"], 1.0, 1.0)];
        rules.sort_by(AssociationRule::ranking);
        assert_eq!(rules[0].antecedent, vec![Item::from("a")]);
    }

    #[test]
    fn check_rejects_overlap_and_bad_confidence() {
        assert!(rule(&["a"], &["b"], 1.0, 1.0).check().is_ok());
        assert!(rule(&["a"], &["a"], 1.0, 1.0).check().is_err());
        assert!(rule(&["a"], &["b"], 0.0, 1.0).check().is_err());
        assert!(rule(&["a"], &["b"], 1.2, 1.0).check().is_err());
        assert!(rule(&[], &["b"], 0.5, 1.0).check().is_err());
    }
}
