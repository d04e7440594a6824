//! Double-checked hot reload of the live model.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use super::freshness::{FileSnapshot, Freshness, FreshnessCheck, SnapshotLoader};
use super::index::RuleIndex;
use super::store::{LoadedModel, ModelStore};
use crate::error::SnapshotError;

/// What a reload check did.
#[derive(Debug, Clone)]
pub enum ReloadOutcome {
    /// The live model already reflects the resource.
    Unchanged,
    /// A new model was built and swapped in.
    Reloaded(Arc<LoadedModel>),
}

/// A snapshot that failed to load, remembered until the resource changes.
#[derive(Debug)]
struct Rejected {
    freshness: Freshness,
    reason: String,
}

/// Rebuilds the store's model when the snapshot resource changes.
///
/// Reloads are serialized by an internal mutex; queries are never blocked by
/// it because they only touch the [`ModelStore`].
pub struct Reloader {
    store: Arc<ModelStore>,
    freshness: Box<dyn FreshnessCheck>,
    loader: Box<dyn SnapshotLoader>,
    reload_lock: Mutex<Option<Rejected>>,
    probe_failure: Mutex<Option<String>>,
    probe_failing: AtomicBool,
    rebuilds: AtomicU64,
}

impl Reloader {
    pub fn new(
        store: Arc<ModelStore>,
        freshness: impl FreshnessCheck + 'static,
        loader: impl SnapshotLoader + 'static,
    ) -> Self {
        Self {
            store,
            freshness: Box::new(freshness),
            loader: Box::new(loader),
            reload_lock: Mutex::new(None),
            probe_failure: Mutex::new(None),
            probe_failing: AtomicBool::new(false),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Reload from a snapshot file tracked by modification time.
    pub fn from_file(store: Arc<ModelStore>, file: FileSnapshot) -> Self {
        Self::new(store, file.clone(), file)
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    /// Number of successful rebuilds so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::SeqCst)
    }

    /// Rebuild and swap in a new model if the resource changed.
    ///
    /// On failure the previous model stays live and the error is returned.
    pub fn maybe_reload(&self) -> Result<ReloadOutcome, SnapshotError> {
        let observed = self.probe()?;
        if self.is_live(observed) {
            return Ok(ReloadOutcome::Unchanged);
        }

        let mut rejected = self.reload_lock.lock();

        // Another caller may have finished this reload while we waited.
        let observed = self.probe()?;
        if self.is_live(observed) {
            return Ok(ReloadOutcome::Unchanged);
        }
        if let Some(previous) = rejected.as_ref().filter(|r| r.freshness == observed) {
            return Err(SnapshotError::Rejected {
                reason: previous.reason.clone(),
            });
        }

        let snapshot = match self.loader.load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    source = %self.loader.describe(),
                    error = %err,
                    "snapshot rejected, keeping previous model"
                );
                *rejected = Some(Rejected {
                    freshness: observed,
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };
        *rejected = None;

        let index = RuleIndex::build(Arc::new(snapshot));
        let rules = index.rule_count();
        self.store.swap(index, observed);
        self.rebuilds.fetch_add(1, Ordering::SeqCst);

        let model = self
            .store
            .current()
            .ok_or_else(|| SnapshotError::Corrupt("model vanished after swap".into()))?;
        info!(
            source = %self.loader.describe(),
            generation = model.generation(),
            rules,
            model_date = %model.snapshot().metadata().model_date(),
            "model reloaded"
        );
        Ok(ReloadOutcome::Reloaded(model))
    }

    /// Probe the resource. A failure identical to the previous one comes back
    /// as [`SnapshotError::Rejected`] until a probe succeeds again.
    fn probe(&self) -> Result<Freshness, SnapshotError> {
        match self.freshness.probe() {
            Ok(observed) => {
                if self.probe_failing.load(Ordering::Acquire) {
                    *self.probe_failure.lock() = None;
                    self.probe_failing.store(false, Ordering::Release);
                }
                Ok(observed)
            }
            Err(err) => {
                let reason = err.to_string();
                let mut last = self.probe_failure.lock();
                if last.as_deref() == Some(reason.as_str()) {
                    return Err(SnapshotError::Rejected { reason });
                }
                *last = Some(reason);
                self.probe_failing.store(true, Ordering::Release);
                Err(err)
            }
        }
    }

    fn is_live(&self, observed: Freshness) -> bool {
        self.store
            .current()
            .is_some_and(|model| model.freshness() == observed)
    }
}
