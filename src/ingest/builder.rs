//! Second pass: group rows into deduplicated transactions.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::filter::AllowSet;
use super::progress::{ProgressObserver, Stage};
use super::source::{scan, FieldNames, RowSource, ScanOptions};
use crate::domain::{Item, Transaction, TransactionId};
use crate::error::IngestionError;

/// Groups `(transaction, item)` rows into [`Transaction`]s.
///
/// Transactions come out in order of their id's first appearance. A
/// transaction whose every item was filtered out is still emitted, empty.
/// Duplicate checks go through a per-transaction hash set, so uncapped
/// transactions still build in linear time.
#[derive(Debug)]
pub struct TransactionBuilder<'a> {
    allow: &'a AllowSet,
    max_len: Option<usize>,
    positions: HashMap<TransactionId, usize>,
    transactions: Vec<Transaction>,
    seen: Vec<HashSet<Item>>,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(allow: &'a AllowSet, max_len: Option<usize>) -> Self {
        Self {
            allow,
            max_len,
            positions: HashMap::new(),
            transactions: Vec::new(),
            seen: Vec::new(),
        }
    }

    /// Feed one complete row.
    pub fn push(&mut self, transaction_id: String, item: String) {
        let position = match self.positions.get(transaction_id.as_str()) {
            Some(&position) => position,
            None => {
                let position = self.transactions.len();
                self.transactions.push(Transaction::new());
                self.seen.push(HashSet::new());
                self.positions.insert(TransactionId::new(transaction_id), position);
                position
            }
        };

        if !self.allow.allows(&item) {
            return;
        }
        let transaction = &mut self.transactions[position];
        if self.max_len.is_some_and(|cap| transaction.len() >= cap) {
            return;
        }
        let seen = &mut self.seen[position];
        if seen.contains(item.as_str()) {
            return;
        }
        let item = Item::new(item);
        seen.insert(item.clone());
        transaction.push_unique(item);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn finish(self) -> Vec<Transaction> {
        self.transactions
    }
}

/// Stream `source` into transactions, applying the allow-set and length cap.
pub fn build(
    source: &dyn RowSource,
    fields: &FieldNames,
    allow: &AllowSet,
    max_len: Option<usize>,
    options: &ScanOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<Vec<Transaction>, IngestionError> {
    let mut builder = TransactionBuilder::new(allow, max_len);
    let stats = scan(source, fields, options, Stage::Building, observer, |tid, item| {
        builder.push(tid, item);
    })?;
    debug!(
        transactions = builder.len(),
        rows = stats.accepted,
        "transactions built"
    );
    Ok(builder.finish())
}
