//! Builders for domain values used across tests.

use chrono::{TimeZone, Utc};

use crate::domain::{AssociationRule, Item, ModelSnapshot, SnapshotMetadata, Transaction};
use crate::ingest::MemorySource;
use crate::mining::{mine, MiningParams};

pub fn item(id: &str) -> Item {
    Item::new(id)
}

pub fn items(ids: &[&str]) -> Vec<Item> {
    ids.iter().map(|id| Item::new(*id)).collect()
}

pub fn transaction(ids: &[&str]) -> Transaction {
    Transaction::from_items(ids.iter().copied())
}

/// `{A,B}, {A,B,C}, {A,B}, {B,C}`.
pub fn scenario_transactions() -> Vec<Transaction> {
    vec![
        transaction(&["A", "B"]),
        transaction(&["A", "B", "C"]),
        transaction(&["A", "B"]),
        transaction(&["B", "C"]),
    ]
}

/// The scenario as `(pid, track)` rows, one playlist per id `1..=4`.
pub fn scenario_rows() -> MemorySource {
    MemorySource::from_pairs([
        ("1", "A"),
        ("1", "B"),
        ("2", "A"),
        ("2", "B"),
        ("2", "C"),
        ("3", "A"),
        ("3", "B"),
        ("4", "B"),
        ("4", "C"),
    ])
}

/// Metadata with a fixed generation time of 2024-01-01T00:00:00Z.
pub fn metadata(transaction_count: u64) -> SnapshotMetadata {
    SnapshotMetadata {
        generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
        transaction_count,
        min_support: 0.5,
        min_confidence: 0.5,
        item_filter: Some("none".into()),
        item_filter_size: None,
        format_version: crate::domain::FORMAT_VERSION,
    }
}

/// A rule with support 0.5.
pub fn rule(antecedent: &[&str], consequent: &[&str], confidence: f64, lift: f64) -> AssociationRule {
    AssociationRule {
        antecedent: items(antecedent),
        consequent: items(consequent),
        support: 0.5,
        confidence,
        lift,
    }
}

pub fn snapshot(rules: Vec<AssociationRule>) -> ModelSnapshot {
    ModelSnapshot::new(metadata(4), Vec::new(), rules)
}

/// Snapshot mined from [`scenario_transactions`] at support and confidence 0.5.
pub fn scenario_snapshot() -> ModelSnapshot {
    let output = mine(scenario_transactions(), &MiningParams::new(0.5, 0.5))
        .expect("scenario mines cleanly");
    ModelSnapshot::new(metadata(output.transaction_count), output.itemsets, output.rules)
}
