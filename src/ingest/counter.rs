//! First pass: per-item occurrence counts.

use std::collections::{HashMap, HashSet};

use super::progress::{ProgressObserver, Stage};
use super::source::{scan, FieldNames, RowSource, ScanOptions, ScanStats};
use crate::domain::Item;
use crate::error::IngestionError;

/// Occurrence count per item over the whole (capped, sampled) source.
#[derive(Debug, Clone, Default)]
pub struct ItemCount {
    counts: HashMap<Item, u64>,
    stats: ScanStats,
}

impl ItemCount {
    pub fn get(&self, item: &str) -> u64 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// Number of distinct items seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Item, u64)> {
        self.counts.iter().map(|(item, count)| (item, *count))
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

impl FromIterator<(Item, u64)> for ItemCount {
    fn from_iter<T: IntoIterator<Item = (Item, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
            stats: ScanStats::default(),
        }
    }
}

/// Count item occurrences in one streaming pass.
///
/// Memory is bounded by the number of distinct items. Duplicate rows within a
/// transaction are counted each time they occur.
pub fn count(
    source: &dyn RowSource,
    fields: &FieldNames,
    options: &ScanOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<ItemCount, IngestionError> {
    let mut counts: HashMap<Item, u64> = HashMap::new();
    let stats = scan(source, fields, options, Stage::Counting, observer, |_, item| {
        match counts.get_mut(item.as_str()) {
            Some(count) => *count += 1,
            None => {
                counts.insert(Item::new(item), 1);
            }
        }
    })?;
    Ok(ItemCount { counts, stats })
}

/// Exact number of distinct transaction ids under the same cap and sampling.
pub fn count_transactions(
    source: &dyn RowSource,
    fields: &FieldNames,
    options: &ScanOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<u64, IngestionError> {
    let mut seen: HashSet<String> = HashSet::new();
    scan(
        source,
        fields,
        options,
        Stage::CountingTransactions,
        observer,
        |tid, _| {
            seen.insert(tid);
        },
    )?;
    Ok(seen.len() as u64)
}
