//! Immutable output of one mining run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::itemset::FrequentItemset;
use super::rule::AssociationRule;
use crate::error::SnapshotError;

/// Current on-disk layout version.
pub const FORMAT_VERSION: u32 = 1;

const fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// Provenance of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// When mining finished. Absent in snapshots produced by older tools.
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    /// Number of transactions the miner saw, empty ones included.
    pub transaction_count: u64,
    pub min_support: f64,
    pub min_confidence: f64,
    /// Human-readable description of the item filter policy.
    #[serde(default)]
    pub item_filter: Option<String>,
    /// Size of the allow-set, or `None` when every item was kept.
    #[serde(default)]
    pub item_filter_size: Option<usize>,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

impl SnapshotMetadata {
    /// `generated_at` in RFC 3339, or `"unknown"`.
    pub fn model_date(&self) -> String {
        self.generated_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Frequent itemsets, rules and metadata from a single mining run.
///
/// Fields are private: a snapshot is never edited once built, only replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    metadata: SnapshotMetadata,
    itemsets: Vec<FrequentItemset>,
    rules: Vec<AssociationRule>,
}

impl ModelSnapshot {
    /// Bundle a mining result. Rules are put into serving order.
    pub fn new(
        metadata: SnapshotMetadata,
        itemsets: Vec<FrequentItemset>,
        mut rules: Vec<AssociationRule>,
    ) -> Self {
        rules.sort_by(AssociationRule::ranking);
        Self {
            metadata,
            itemsets,
            rules,
        }
    }

    /// Check a snapshot that came from outside the miner and restore rule order.
    pub fn validated(mut self) -> Result<Self, SnapshotError> {
        if self.metadata.format_version > FORMAT_VERSION {
            return Err(SnapshotError::Corrupt(format!(
                "unsupported format version {}",
                self.metadata.format_version
            )));
        }
        for (position, rule) in self.rules.iter().enumerate() {
            rule.check()
                .map_err(|reason| SnapshotError::Corrupt(format!("rule {position}: {reason}")))?;
        }
        self.rules.sort_by(AssociationRule::ranking);
        Ok(self)
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn itemsets(&self) -> &[FrequentItemset] {
        &self.itemsets
    }

    /// Rules in confidence desc, lift desc order.
    pub fn rules(&self) -> &[AssociationRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Item;

    fn metadata() -> SnapshotMetadata {
        SnapshotMetadata {
            generated_at: None,
            transaction_count: 4,
            min_support: 0.5,
            min_confidence: 0.5,
            item_filter: None,
            item_filter_size: None,
            format_version: FORMAT_VERSION,
        }
    }

    fn rule(a: &str, c: &str, confidence: f64) -> AssociationRule {
        AssociationRule {
            antecedent: vec![Item::from(a)],
            consequent: vec![Item::from(c)],
            support: 0.5,
            confidence,
            lift: 1.0,
        }
    }

    #[test]
    fn new_sorts_rules() {
        let snapshot = ModelSnapshot::new(
            metadata(),
            vec![],
            vec![rule("a", "b", 0.5), rule("c", "d", 1.0)],
        );
        assert_eq!(snapshot.rules()[0].confidence, 1.0);
    }

    #[test]
    fn model_date_falls_back_to_unknown() {
        assert_eq!(metadata().model_date(), "unknown");
    }

    #[test]
    fn validated_rejects_corrupt_rules() {
        let snapshot = ModelSnapshot {
            metadata: metadata(),
            itemsets: vec![],
            rules: vec![rule("a", "a", 0.5)],
        };
        assert!(matches!(snapshot.validated(), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn validated_rejects_newer_format() {
        let mut meta = metadata();
        meta.format_version = FORMAT_VERSION + 1;
        let snapshot = ModelSnapshot::new(meta, vec![], vec![]);
        assert!(snapshot.validated().is_err());
    }
}
