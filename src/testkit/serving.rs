//! Scriptable snapshot source for reload tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::ModelSnapshot;
use crate::error::SnapshotError;
use crate::serving::{ManualFreshness, ModelStore, Reloader, SnapshotLoader};

/// Returns whatever snapshot (or failure) was last scripted.
#[derive(Debug)]
pub struct ScriptedLoader {
    next: Mutex<Result<ModelSnapshot, String>>,
    loads: AtomicU64,
}

impl ScriptedLoader {
    pub fn new(snapshot: ModelSnapshot) -> Arc<Self> {
        Arc::new(Self {
            next: Mutex::new(Ok(snapshot)),
            loads: AtomicU64::new(0),
        })
    }

    pub fn set_snapshot(&self, snapshot: ModelSnapshot) {
        *self.next.lock() = Ok(snapshot);
    }

    /// Make subsequent loads fail as a corrupt snapshot.
    pub fn set_failure(&self, reason: &str) {
        *self.next.lock() = Err(reason.to_string());
    }

    /// Number of times the resource was read.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }
}

impl SnapshotLoader for ScriptedLoader {
    fn load(&self) -> Result<ModelSnapshot, SnapshotError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.next.lock().clone().map_err(SnapshotError::Corrupt)
    }

    fn describe(&self) -> String {
        "scripted".into()
    }
}

/// A reloader over a fresh store driven by a manual version counter.
pub fn reloader(
    version: &Arc<ManualFreshness>,
    loader: &Arc<ScriptedLoader>,
) -> Arc<Reloader> {
    Arc::new(Reloader::new(
        Arc::new(ModelStore::new()),
        version.clone(),
        loader.clone(),
    ))
}
