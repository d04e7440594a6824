//! Change detection for the external snapshot resource.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::domain::ModelSnapshot;
use crate::error::SnapshotError;
use crate::persistence;

/// Opaque marker of a snapshot resource's state. Two equal markers mean the
/// resource has not changed between the probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Freshness {
    stamp: u128,
    len: u64,
}

impl Freshness {
    /// Marker for a monotonically increasing version number.
    pub const fn version(version: u64) -> Self {
        Self {
            stamp: version as u128,
            len: 0,
        }
    }

    /// Marker for a file's modification time (ns since the epoch) and length.
    pub const fn modified(nanos: u128, len: u64) -> Self {
        Self { stamp: nanos, len }
    }
}

/// Probes the current state of the snapshot resource.
pub trait FreshnessCheck: Send + Sync {
    fn probe(&self) -> Result<Freshness, SnapshotError>;
}

impl<T: FreshnessCheck + ?Sized> FreshnessCheck for Arc<T> {
    fn probe(&self) -> Result<Freshness, SnapshotError> {
        (**self).probe()
    }
}

/// Produces a snapshot from the resource.
pub trait SnapshotLoader: Send + Sync {
    fn load(&self) -> Result<ModelSnapshot, SnapshotError>;

    /// Where snapshots come from, for logs.
    fn describe(&self) -> String;
}

impl<T: SnapshotLoader + ?Sized> SnapshotLoader for Arc<T> {
    fn load(&self) -> Result<ModelSnapshot, SnapshotError> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A snapshot file on disk, tracked by modification time and size.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FreshnessCheck for FileSnapshot {
    fn probe(&self) -> Result<Freshness, SnapshotError> {
        let metadata = std::fs::metadata(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SnapshotError::Missing {
                    path: self.path.clone(),
                }
            } else {
                SnapshotError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        let nanos = metadata
            .modified()
            .ok()
            .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| elapsed.as_nanos());
        Ok(Freshness::modified(nanos, metadata.len()))
    }
}

impl SnapshotLoader for FileSnapshot {
    fn load(&self) -> Result<ModelSnapshot, SnapshotError> {
        persistence::load_snapshot(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A version counter bumped by hand.
///
/// Stands in for file timestamps where a deterministic change signal is
/// needed, for example when snapshots are pushed in-process.
#[derive(Debug, Default)]
pub struct ManualFreshness {
    version: AtomicU64,
}

impl ManualFreshness {
    pub fn new(version: u64) -> Self {
        Self {
            version: AtomicU64::new(version),
        }
    }

    /// Advance the version and return the new value.
    pub fn bump(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

impl FreshnessCheck for ManualFreshness {
    fn probe(&self) -> Result<Freshness, SnapshotError> {
        Ok(Freshness::version(self.current()))
    }
}
