//! JSON snapshot files with atomic replacement.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::ModelSnapshot;
use crate::error::SnapshotError;

/// Write `snapshot` to `path`.
///
/// The snapshot is serialized into a temporary file in the destination
/// directory and renamed over `path`, so a concurrent reader sees either the
/// old file or the complete new one.
pub fn save_snapshot(snapshot: &ModelSnapshot, path: &Path) -> Result<(), SnapshotError> {
    let io_err = |source: io::Error| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(io_err)?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer(&mut writer, snapshot).map_err(SnapshotError::Encode)?;
        writer.flush().map_err(io_err)?;
    }
    temp_file.as_file().sync_all().map_err(io_err)?;
    temp_file.persist(path).map_err(|e| io_err(e.error))?;

    info!(
        path = %path.display(),
        rules = snapshot.rules().len(),
        itemsets = snapshot.itemsets().len(),
        "snapshot saved"
    );
    Ok(())
}

/// Read and validate a snapshot from `path`.
pub fn load_snapshot(path: &Path) -> Result<ModelSnapshot, SnapshotError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SnapshotError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let snapshot: ModelSnapshot = serde_json::from_reader(BufReader::new(file))?;
    snapshot.validated()
}
