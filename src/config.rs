//! Configuration loading and validation.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! absent file or section is fine. `MODEL_PATH` and `PORT` from the
//! environment (or a `.env` file) override the file; command-line flags
//! override both.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::ingest::{
    FieldNames, ScanOptions, DEFAULT_ITEM_FIELD, DEFAULT_PROGRESS_INTERVAL, DEFAULT_SEED,
    DEFAULT_TRANSACTION_FIELD,
};
use crate::mining::{MiningParams, DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT};
use crate::pipeline::{select_policy, MiningJob, DEFAULT_MAX_TRANSACTION_LEN};
use crate::serving::{DEFAULT_MAX_RESULTS, DEFAULT_PORT, SERVICE_VERSION};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "mixtape.toml";

const DEFAULT_MODEL_PATH: &str = "model/playlist_rules.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub mining: MiningConfig,
    pub serving: ServingConfig,
}

/// Logging configuration. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
            _ => {
                fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Settings of `mixtape mine`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// CSV files read in order.
    pub inputs: Vec<PathBuf>,
    pub transaction_field: String,
    pub item_field: String,
    pub min_support: f64,
    pub min_confidence: f64,
    /// Stop after this many raw rows.
    pub max_rows: Option<u64>,
    /// Fraction of rows to keep, in (0, 1].
    pub sample_frac: Option<f64>,
    /// Items kept per transaction; 0 disables the cap.
    pub max_transaction_len: usize,
    pub min_support_abs: Option<u64>,
    pub top_k_items: Option<usize>,
    /// Apply the support filter between the two passes.
    pub item_filter: bool,
    pub progress_interval: u64,
    pub seed: u64,
    /// Where the snapshot is written.
    pub output: PathBuf,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            transaction_field: DEFAULT_TRANSACTION_FIELD.into(),
            item_field: DEFAULT_ITEM_FIELD.into(),
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_rows: None,
            sample_frac: None,
            max_transaction_len: DEFAULT_MAX_TRANSACTION_LEN,
            min_support_abs: None,
            top_k_items: None,
            item_filter: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            seed: DEFAULT_SEED,
            output: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl MiningConfig {
    /// The job these settings describe.
    pub fn job(&self) -> MiningJob {
        MiningJob {
            fields: FieldNames::new(&self.transaction_field, &self.item_field),
            scan: ScanOptions {
                row_cap: self.max_rows,
                sample_rate: self.sample_frac,
                seed: self.seed,
                progress_interval: self.progress_interval,
            },
            policy: select_policy(
                self.item_filter,
                self.top_k_items,
                self.min_support_abs,
                self.min_support,
            ),
            max_transaction_len: (self.max_transaction_len > 0).then_some(self.max_transaction_len),
            params: MiningParams::new(self.min_support, self.min_confidence),
        }
    }
}

/// Settings of `mixtape serve`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    pub model_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_results: usize,
    /// Reported as `version` in every response.
    pub version: String,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            max_results: DEFAULT_MAX_RESULTS,
            version: SERVICE_VERSION.into(),
        }
    }
}

impl Config {
    /// Read, apply environment overrides, and validate.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `mixtape.toml` if present, else defaults.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(fallback);
        }
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MODEL_PATH` and `PORT` as returned by `lookup`.
    #[allow(clippy::result_large_err)]
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("MODEL_PATH").filter(|p| !p.is_empty()) {
            self.serving.model_path = PathBuf::from(path);
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            self.serving.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT",
                reason: format!("not a port number: {port}"),
            })?;
        }
        Ok(())
    }

    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected 'pretty' or 'json', got '{}'", self.logging.format),
            }
            .into());
        }

        let mining = &self.mining;
        if mining.transaction_field.is_empty() {
            return Err(ConfigError::MissingField {
                field: "mining.transaction_field",
            }
            .into());
        }
        if mining.item_field.is_empty() {
            return Err(ConfigError::MissingField {
                field: "mining.item_field",
            }
            .into());
        }
        for (field, value) in [
            ("mining.min_support", mining.min_support),
            ("mining.min_confidence", mining.min_confidence),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be in (0, 1], got {value}"),
                }
                .into());
            }
        }
        if let Some(frac) = mining.sample_frac {
            if !(frac > 0.0 && frac <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    field: "mining.sample_frac",
                    reason: format!("must be in (0, 1], got {frac}"),
                }
                .into());
            }
        }
        if mining.top_k_items == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "mining.top_k_items",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if mining.progress_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mining.progress_interval",
                reason: "must be at least 1".into(),
            }
            .into());
        }

        if self.serving.model_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "serving.model_path",
            }
            .into());
        }
        if self.serving.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "serving.max_results",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ingest::SupportPolicy;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.serving.port, 30502);
        assert_eq!(config.mining.max_transaction_len, 200);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [mining]
            min_support = 0.1
            top_k_items = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.mining.min_support, 0.1);
        assert_eq!(config.mining.item_field, "track_uri");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.mining.job().policy, SupportPolicy::TopK(500));
    }

    #[test]
    fn env_overrides_model_path_and_port() {
        let mut config = Config::default();
        config
            .apply_env(|key| match key {
                "MODEL_PATH" => Some("/srv/rules.json".into()),
                "PORT" => Some("8080".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.serving.model_path, PathBuf::from("/srv/rules.json"));
        assert_eq!(config.serving.port, 8080);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "PORT", .. })
        ));
    }

    #[test]
    fn zero_length_cap_means_uncapped() {
        let mut config = MiningConfig::default();
        config.max_transaction_len = 0;
        assert_eq!(config.job().max_transaction_len, None);
    }

    #[test]
    fn unknown_log_format_fails_validation() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "logging.format",
                ..
            }))
        ));
    }
}
