//! Holder of the live model.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::freshness::Freshness;
use super::index::RuleIndex;
use crate::domain::ModelSnapshot;

/// An index together with the freshness marker it was built from.
#[derive(Debug)]
pub struct LoadedModel {
    index: RuleIndex,
    freshness: Freshness,
    loaded_at: DateTime<Utc>,
    generation: u64,
}

impl LoadedModel {
    pub fn index(&self) -> &RuleIndex {
        &self.index
    }

    pub fn snapshot(&self) -> &ModelSnapshot {
        self.index.snapshot()
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// 1 for the first model swapped into a store, then increasing.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Exactly one live model reference, replaced wholesale.
///
/// Readers clone the `Arc` under a short read lock and then work on their
/// copy without any lock, so a swap never waits for queries to finish and
/// never exposes a partially built model.
#[derive(Debug, Default)]
pub struct ModelStore {
    current: RwLock<Option<Arc<LoadedModel>>>,
    generations: AtomicU64,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live model, if one has ever been loaded.
    pub fn current(&self) -> Option<Arc<LoadedModel>> {
        self.current.read().clone()
    }

    /// Install `index` as the live model and return the one it replaced.
    pub fn swap(&self, index: RuleIndex, freshness: Freshness) -> Option<Arc<LoadedModel>> {
        let model = Arc::new(LoadedModel {
            index,
            freshness,
            loaded_at: Utc::now(),
            generation: self.generations.fetch_add(1, Ordering::SeqCst) + 1,
        });
        self.current.write().replace(model)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }
}
