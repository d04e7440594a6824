//! Streaming ingestion: count, filter, build.
//!
//! The row source is read twice. The first pass counts item occurrences, the
//! support filter turns those counts into an allow-set, and the second pass
//! groups the surviving items into transactions.

mod builder;
mod counter;
mod filter;
mod progress;
mod source;
mod tabular;

pub use builder::{build, TransactionBuilder};
pub use counter::{count, count_transactions, ItemCount};
pub use filter::{filter, AllowSet, SupportPolicy};
pub use progress::{LogProgress, NoProgress, ProgressObserver, Stage};
pub use source::{
    FieldNames, MemorySource, Row, RowIter, RowSource, ScanOptions, ScanStats,
    DEFAULT_ITEM_FIELD, DEFAULT_PROGRESS_INTERVAL, DEFAULT_SEED, DEFAULT_TRANSACTION_FIELD,
};
pub use tabular::CsvSource;
