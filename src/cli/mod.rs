//! Command-line interface definitions.

pub mod check;
pub mod inspect;
pub mod mine;
pub mod output;
pub mod query;
pub mod recommend;
pub mod serve;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

/// Mixtape - playlist co-occurrence mining and track recommendations.
#[derive(Parser, Debug)]
#[command(name = "mixtape")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: ./mixtape.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine association rules from playlist CSV files
    Mine(MineArgs),

    /// Serve recommendations over HTTP, reloading the snapshot when it changes
    Serve(ServeArgs),

    /// Answer one recommendation query from a snapshot file
    Recommend(RecommendArgs),

    /// Send a recommendation query to a running server
    Query(QueryArgs),

    /// Show snapshot metadata and its strongest rules
    Inspect(InspectArgs),

    /// Validate the configuration file
    Check,
}

/// Arguments for the `mine` subcommand. Unset flags fall back to `[mining]`.
#[derive(Parser, Debug, Default)]
pub struct MineArgs {
    /// Input CSV file (repeatable)
    #[arg(short, long = "input")]
    pub inputs: Vec<PathBuf>,

    /// Column holding the playlist id
    #[arg(long)]
    pub pid_col: Option<String>,

    /// Column holding the track id
    #[arg(long)]
    pub item_col: Option<String>,

    /// Minimum support ratio
    #[arg(long)]
    pub min_sup: Option<f64>,

    /// Minimum rule confidence
    #[arg(long)]
    pub min_conf: Option<f64>,

    /// Stop after this many rows
    #[arg(long)]
    pub max_rows: Option<u64>,

    /// Keep each row with this probability
    #[arg(long)]
    pub sample_frac: Option<f64>,

    /// Maximum tracks kept per playlist (0 = unlimited)
    #[arg(long)]
    pub max_tx_len: Option<usize>,

    /// Keep tracks occurring at least this many times
    #[arg(long)]
    pub min_support_abs: Option<u64>,

    /// Keep only the K most frequent tracks
    #[arg(long)]
    pub top_k_items: Option<usize>,

    /// Disable the item filter between the two passes
    #[arg(long)]
    pub no_item_filter: bool,

    /// Rows between progress updates
    #[arg(long)]
    pub progress_interval: Option<u64>,

    /// Sampling seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Snapshot output path
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Count and filter only; no mining, no snapshot written
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Snapshot file to serve
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Maximum tracks per response
    #[arg(long)]
    pub max_results: Option<usize>,
}

/// Arguments for the `recommend` subcommand.
#[derive(Parser, Debug)]
pub struct RecommendArgs {
    /// Track ids the recommendation is for
    #[arg(required = true)]
    pub songs: Vec<String>,

    /// Snapshot file to read
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Maximum tracks to return
    #[arg(long)]
    pub max_results: Option<usize>,
}

/// Arguments for the `query` subcommand.
#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Track ids the recommendation is for
    #[arg(required = true)]
    pub songs: Vec<String>,

    /// Endpoint URL (default: http://localhost:<port>/api/recommend)
    #[arg(long)]
    pub url: Option<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Snapshot file to read
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Number of rules to list
    #[arg(short = 'n', long, default_value = "10")]
    pub top: usize,
}

impl Cli {
    /// Load configuration and apply the global logging flags.
    #[allow(clippy::result_large_err)]
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        } else if self.verbose > 1 {
            config.logging.level = "trace".into();
        } else if self.verbose == 1 {
            config.logging.level = "debug".into();
        } else if self.quiet {
            config.logging.level = "warn".into();
        }
        if self.json_logs {
            config.logging.format = "json".into();
        }
        Ok(config)
    }
}
