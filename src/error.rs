use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors with structured variants.
///
/// Raised before any row is read or any snapshot is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// The row source could not be read. Fatal to a mining run.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("no readable input among {count} file(s)")]
    NoInput { count: usize },

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read row {line} of {path}: {source}")]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Mining aborted. No snapshot is produced when this is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MiningError {
    #[error("{field} must be in (0, 1], got {value}")]
    ThresholdOutOfRange { field: &'static str, value: f64 },

    #[error("transaction {transaction} contains an item with an empty identifier")]
    EmptyItem { transaction: usize },

    #[error("frequent itemset of {len} items exceeds the supported maximum of {max}")]
    ItemsetTooLarge { len: usize, max: usize },

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// A persisted snapshot could not be read, parsed or accepted.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot not found at {path}")]
    Missing { path: PathBuf },

    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("snapshot previously rejected and unchanged since: {reason}")]
    Rejected { reason: String },
}

/// A recommendation request was malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("missing 'songs' field")]
    MissingSongs,

    #[error("'songs' must be a non-empty list")]
    EmptySongs,

    #[error("malformed request body: {reason}")]
    Malformed { reason: String },
}

/// Per-request failures of the serving path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServeError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("model not available: {reason}")]
    Unavailable { reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Mining(#[from] MiningError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
