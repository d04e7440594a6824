//! Domain types shared by ingestion, mining and serving.

mod item;
mod itemset;
mod rule;
mod snapshot;
mod transaction;

pub use item::{Item, TransactionId};
pub use itemset::FrequentItemset;
pub use rule::AssociationRule;
pub use snapshot::{ModelSnapshot, SnapshotMetadata, FORMAT_VERSION};
pub use transaction::Transaction;
