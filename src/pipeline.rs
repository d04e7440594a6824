//! End-to-end mining job: count, filter, build, mine, snapshot.

use chrono::Utc;
use tracing::info;

use crate::domain::{Item, ModelSnapshot, SnapshotMetadata, FORMAT_VERSION};
use crate::error::{ConfigError, Result};
use crate::ingest::{
    self, AllowSet, FieldNames, ItemCount, ProgressObserver, RowSource, ScanOptions, ScanStats,
    SupportPolicy,
};
use crate::mining::{self, MiningOutput, MiningParams};

/// Default cap on items kept per transaction.
pub const DEFAULT_MAX_TRANSACTION_LEN: usize = 200;

/// Number of most frequent items listed in an [`IngestReport`].
const REPORT_TOP_ITEMS: usize = 10;

/// Pick the item filter from configuration overrides.
///
/// An explicit top-K wins over an absolute count, which wins over the ratio
/// derived from `min_support`. Disabling filtering overrides all of them.
pub fn select_policy(
    filtering: bool,
    top_k_items: Option<usize>,
    min_support_abs: Option<u64>,
    min_support: f64,
) -> SupportPolicy {
    if !filtering {
        return SupportPolicy::NoFilter;
    }
    match (top_k_items, min_support_abs) {
        (Some(k), _) => SupportPolicy::TopK(k),
        (None, Some(min)) => SupportPolicy::AbsoluteSupport(min),
        (None, None) => SupportPolicy::RatioSupport(min_support),
    }
}

/// Everything a mining run needs besides the row source.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningJob {
    pub fields: FieldNames,
    pub scan: ScanOptions,
    pub policy: SupportPolicy,
    pub max_transaction_len: Option<usize>,
    pub params: MiningParams,
}

impl Default for MiningJob {
    fn default() -> Self {
        let params = MiningParams::default();
        Self {
            fields: FieldNames::default(),
            scan: ScanOptions::default(),
            policy: SupportPolicy::RatioSupport(params.min_support),
            max_transaction_len: Some(DEFAULT_MAX_TRANSACTION_LEN),
            params,
        }
    }
}

/// Statistics of the counting and filtering stage.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub counting: ScanStats,
    pub distinct_items: usize,
    /// Exact transaction count, when the policy needed one.
    pub transaction_count: Option<u64>,
    pub policy: SupportPolicy,
    /// Items retained by the filter, `None` when all are kept.
    pub allowed_items: Option<usize>,
    pub top_items: Vec<(Item, u64)>,
}

/// Result of [`MiningJob::prepare`].
#[derive(Debug, Clone)]
pub struct Prepared {
    pub allow: AllowSet,
    pub report: IngestReport,
}

/// Result of [`MiningJob::run`].
#[derive(Debug, Clone)]
pub struct MiningRun {
    pub snapshot: ModelSnapshot,
    pub report: IngestReport,
    pub transactions: usize,
}

impl MiningJob {
    /// Reject settings that would make a run meaningless, before any row is read.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        if let Some(rate) = self.scan.sample_rate {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    field: "sample_frac",
                    reason: format!("must be in (0, 1], got {rate}"),
                }
                .into());
            }
        }
        if self.max_transaction_len == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_transaction_len",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.scan.progress_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "progress_interval",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        match self.policy {
            SupportPolicy::TopK(0) => Err(ConfigError::InvalidValue {
                field: "top_k_items",
                reason: "must be at least 1".into(),
            }
            .into()),
            SupportPolicy::RatioSupport(ratio) if !(ratio > 0.0 && ratio <= 1.0) => {
                Err(ConfigError::InvalidValue {
                    field: "min_support",
                    reason: format!("must be in (0, 1], got {ratio}"),
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    /// First pass plus filtering. Used on its own for dry runs.
    pub fn prepare(
        &self,
        source: &dyn RowSource,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Prepared> {
        self.validate()?;

        let counts = ingest::count(source, &self.fields, &self.scan, observer)?;
        let transaction_count = if self.policy.needs_transaction_count() {
            Some(ingest::count_transactions(
                source,
                &self.fields,
                &self.scan,
                observer,
            )?)
        } else {
            None
        };
        let allow = ingest::filter(&counts, transaction_count, &self.policy)?;

        info!(
            distinct_items = counts.len(),
            allowed_items = ?allow.size(),
            policy = %self.policy,
            "item filter applied"
        );

        let report = IngestReport {
            counting: *counts.stats(),
            distinct_items: counts.len(),
            transaction_count,
            policy: self.policy.clone(),
            allowed_items: allow.size(),
            top_items: top_items(&counts, REPORT_TOP_ITEMS),
        };
        Ok(Prepared { allow, report })
    }

    /// Full run producing a snapshot. Nothing is persisted here.
    pub fn run(
        &self,
        source: &dyn RowSource,
        observer: &mut dyn ProgressObserver,
    ) -> Result<MiningRun> {
        let Prepared { allow, report } = self.prepare(source, observer)?;

        let transactions = ingest::build(
            source,
            &self.fields,
            &allow,
            self.max_transaction_len,
            &self.scan,
            observer,
        )?;
        let transaction_total = transactions.len();

        let MiningOutput {
            itemsets,
            rules,
            transaction_count,
        } = mining::mine(transactions, &self.params)?;

        let metadata = SnapshotMetadata {
            generated_at: Some(Utc::now()),
            transaction_count,
            min_support: self.params.min_support,
            min_confidence: self.params.min_confidence,
            item_filter: Some(self.policy.to_string()),
            item_filter_size: allow.size(),
            format_version: FORMAT_VERSION,
        };
        let snapshot = ModelSnapshot::new(metadata, itemsets, rules);
        info!(
            transactions = transaction_total,
            itemsets = snapshot.itemsets().len(),
            rules = snapshot.rules().len(),
            "mining run complete"
        );

        Ok(MiningRun {
            snapshot,
            report,
            transactions: transaction_total,
        })
    }
}

fn top_items(counts: &ItemCount, limit: usize) -> Vec<(Item, u64)> {
    let mut items: Vec<(Item, u64)> = counts
        .iter()
        .map(|(item, count)| (item.clone(), count))
        .collect();
    items.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ingest::{MemorySource, NoProgress};

    fn source() -> MemorySource {
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

    fn job(policy: SupportPolicy) -> MiningJob {
        MiningJob {
            policy,
            params: MiningParams::new(0.5, 0.5),
            ..MiningJob::default()
        }
    }

    #[test]
    fn policy_precedence() {
        assert_eq!(
            select_policy(true, Some(5), Some(3), 0.1),
            SupportPolicy::TopK(5)
        );
        assert_eq!(
            select_policy(true, None, Some(3), 0.1),
            SupportPolicy::AbsoluteSupport(3)
        );
        assert_eq!(
            select_policy(true, None, None, 0.1),
            SupportPolicy::RatioSupport(0.1)
        );
        assert_eq!(
            select_policy(false, Some(5), None, 0.1),
            SupportPolicy::NoFilter
        );
    }

    #[test]
    fn prepare_counts_transactions_only_for_ratio() {
        let ratio = job(SupportPolicy::RatioSupport(0.5))
            .prepare(&source(), &mut NoProgress)
            .unwrap();
        assert_eq!(ratio.report.transaction_count, Some(4));
        // threshold floor(0.5 * 4) = 2 keeps A, B and C
        assert_eq!(ratio.report.allowed_items, Some(3));

        let top = job(SupportPolicy::TopK(1))
            .prepare(&source(), &mut NoProgress)
            .unwrap();
        assert_eq!(top.report.transaction_count, None);
        assert!(top.allow.allows("B"));
        assert!(!top.allow.allows("A"));
        assert_eq!(top.report.top_items[0], (Item::new("B"), 4));
    }

    #[test]
    fn run_produces_sorted_snapshot() {
        let run = job(SupportPolicy::NoFilter)
            .run(&source(), &mut NoProgress)
            .unwrap();
        let snapshot = run.snapshot;
        assert_eq!(run.transactions, 4);
        assert_eq!(snapshot.metadata().transaction_count, 4);
        assert_eq!(snapshot.metadata().item_filter.as_deref(), Some("none"));
        assert!(snapshot.metadata().generated_at.is_some());

        let first = &snapshot.rules()[0];
        assert_eq!(first.antecedent, vec![Item::new("A")]);
        assert_eq!(first.consequent, vec![Item::new("B")]);
        assert!((first.confidence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_settings_fail_before_reading() {
        let mut bad = job(SupportPolicy::NoFilter);
        bad.scan.sample_rate = Some(1.5);
        assert!(matches!(
            bad.prepare(&source(), &mut NoProgress),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "sample_frac",
                ..
            }))
        ));

        let mut bad = job(SupportPolicy::NoFilter);
        bad.params.min_confidence = 0.0;
        assert!(matches!(
            bad.prepare(&source(), &mut NoProgress),
            Err(Error::Mining(_))
        ));
    }
}
