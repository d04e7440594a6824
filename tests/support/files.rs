//! Temporary input, config and snapshot files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory that lives as long as the returned guard.
pub fn workspace() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

/// A playlist CSV with `pid,track_uri,artist` columns built from
/// `(pid, track)` pairs.
pub fn playlist_csv(dir: &Path, name: &str, rows: &[(&str, &str)]) -> PathBuf {
    let mut contents = String::from("pid,track_uri,artist\n");
    for (pid, track) in rows {
        contents.push_str(&format!("{pid},{track},someone\n"));
    }
    write(dir, name, &contents)
}

/// The four-playlist scenario `{A,B}, {A,B,C}, {A,B}, {B,C}`.
pub const SCENARIO_ROWS: &[(&str, &str)] = &[
    ("1", "A"),
    ("1", "B"),
    ("2", "A"),
    ("2", "B"),
    ("2", "C"),
    ("3", "A"),
    ("3", "B"),
    ("4", "B"),
    ("4", "C"),
];
