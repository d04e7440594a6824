//! Row source contract and the shared scanning loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::progress::{ProgressObserver, Stage};
use crate::error::IngestionError;

/// Default transaction-id column.
pub const DEFAULT_TRANSACTION_FIELD: &str = "pid";
/// Default item-id column.
pub const DEFAULT_ITEM_FIELD: &str = "track_uri";
/// Seed used when sampling is enabled and none is configured.
pub const DEFAULT_SEED: u64 = 42;
/// Rows between progress observations.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

/// Names of the two projected fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub transaction: String,
    pub item: String,
}

impl FieldNames {
    pub fn new(transaction: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            transaction: transaction.into(),
            item: item.into(),
        }
    }
}

impl Default for FieldNames {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSACTION_FIELD, DEFAULT_ITEM_FIELD)
    }
}

/// One record projected onto the transaction and item fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub transaction_id: Option<String>,
    pub item_id: Option<String>,
}

impl Row {
    pub fn new(transaction_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
            item_id: Some(item_id.into()),
        }
    }

    /// Both fields, if both are present and non-empty.
    pub fn complete(self) -> Option<(String, String)> {
        match (self.transaction_id, self.item_id) {
            (Some(tid), Some(item)) if !tid.is_empty() && !item.is_empty() => Some((tid, item)),
            _ => None,
        }
    }
}

pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, IngestionError>> + 'a>;

/// A re-openable, ordered sequence of rows.
///
/// Mining reads the source more than once, so every call to `open` must start
/// a fresh pass over the same rows in the same order.
pub trait RowSource {
    fn open(&self, fields: &FieldNames) -> Result<RowIter<'_>, IngestionError>;
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Row>,
}

impl MemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build from complete `(transaction, item)` pairs.
    pub fn from_pairs<T, I>(pairs: impl IntoIterator<Item = (T, I)>) -> Self
    where
        T: Into<String>,
        I: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(t, i)| Row::new(t, i)).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowSource for MemorySource {
    fn open(&self, _fields: &FieldNames) -> Result<RowIter<'_>, IngestionError> {
        Ok(Box::new(self.rows.iter().cloned().map(Ok)))
    }
}

/// Bounds and sampling shared by every pass over a source.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Stop after this many raw rows have been examined.
    pub row_cap: Option<u64>,
    /// Keep each examined row with this probability. Values outside (0, 1)
    /// disable sampling.
    pub sample_rate: Option<f64>,
    pub seed: u64,
    pub progress_interval: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            row_cap: None,
            sample_rate: None,
            seed: DEFAULT_SEED,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ScanOptions {
    fn sampling_rate(&self) -> Option<f64> {
        self.sample_rate.filter(|rate| *rate > 0.0 && *rate < 1.0)
    }
}

/// Row accounting for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Raw rows read from the source, up to the cap.
    pub examined: u64,
    /// Rows dropped by sampling.
    pub sampled_out: u64,
    /// Rows missing a required field.
    pub skipped: u64,
    /// Rows handed to the pass.
    pub accepted: u64,
}

/// Drive one pass: cap, sample, project, then hand complete rows to `visit`.
///
/// A fresh RNG seeded from `options.seed` is created per pass so that every
/// pass over the same source keeps the same rows.
pub(crate) fn scan<F>(
    source: &dyn RowSource,
    fields: &FieldNames,
    options: &ScanOptions,
    stage: Stage,
    observer: &mut dyn ProgressObserver,
    mut visit: F,
) -> Result<ScanStats, IngestionError>
where
    F: FnMut(String, String),
{
    let mut stats = ScanStats::default();
    let rate = options.sampling_rate();
    let mut rng = rate.map(|_| StdRng::seed_from_u64(options.seed));
    let interval = options.progress_interval.max(1);

    let rows = source.open(fields)?;
    let rows: RowIter<'_> = match options.row_cap {
        Some(cap) => Box::new(rows.take(usize::try_from(cap).unwrap_or(usize::MAX))),
        None => rows,
    };

    for row in rows {
        let row = row?;
        stats.examined += 1;
        if stats.examined % interval == 0 {
            observer.on_progress(stage, stats.examined);
        }

        if let (Some(rng), Some(rate)) = (rng.as_mut(), rate) {
            if !rng.gen_bool(rate) {
                stats.sampled_out += 1;
                continue;
            }
        }

        match row.complete() {
            Some((tid, item)) => {
                stats.accepted += 1;
                visit(tid, item);
            }
            None => stats.skipped += 1,
        }
    }

    observer.on_finish(stage, &stats);
    Ok(stats)
}
