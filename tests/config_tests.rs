mod support;

use std::path::PathBuf;

use mixtape::config::Config;
use mixtape::error::{ConfigError, Error};
use mixtape::ingest::SupportPolicy;
use support::files::{workspace, write};

#[test]
fn full_config_loads() {
    let dir = workspace();
    let path = write(
        dir.path(),
        "mixtape.toml",
        r#"
[logging]
level = "debug"
format = "json"

[mining]
inputs = ["data/part1.csv", "data/part2.csv"]
transaction_field = "playlist_id"
item_field = "uri"
min_support = 0.05
min_confidence = 0.6
max_rows = 1000000
sample_frac = 0.25
max_transaction_len = 100
min_support_abs = 50
progress_interval = 5000
seed = 7
output = "out/rules.json"

[serving]
model_path = "/model/playlist_rules.json"
port = 8080
max_results = 5
version = "1.0.1"
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.mining.inputs.len(), 2);
    assert_eq!(config.serving.max_results, 5);

    let job = config.mining.job();
    assert_eq!(job.policy, SupportPolicy::AbsoluteSupport(50));
    assert_eq!(job.fields.transaction, "playlist_id");
    assert_eq!(job.scan.row_cap, Some(1_000_000));
    assert_eq!(job.scan.sample_rate, Some(0.25));
    assert_eq!(job.scan.seed, 7);
    assert_eq!(job.max_transaction_len, Some(100));
}

#[test]
fn empty_file_uses_defaults() {
    let dir = workspace();
    let path = write(dir.path(), "empty.toml", "");
    let config = Config::load(&path).unwrap();

    assert_eq!(config.mining.transaction_field, "pid");
    assert_eq!(config.mining.item_field, "track_uri");
    assert_eq!(config.mining.min_support, 0.03);
    assert_eq!(config.mining.min_confidence, 0.5);
    assert!(config.mining.item_filter);
    assert_eq!(config.mining.job().policy, SupportPolicy::RatioSupport(0.03));
}

#[test]
fn config_rejects_out_of_range_confidence() {
    let dir = workspace();
    let path = write(
        dir.path(),
        "bad.toml",
        "[mining]\nmin_confidence = 1.5\n",
    );

    match Config::load(&path) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "mining.min_confidence",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid confidence error, got {err}"),
        Ok(config) => panic!(
            "Expected confidence to be rejected, got {}",
            config.mining.min_confidence
        ),
    }
}

#[test]
fn config_rejects_empty_item_field() {
    let dir = workspace();
    let path = write(dir.path(), "bad.toml", "[mining]\nitem_field = \"\"\n");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::MissingField {
            field: "mining.item_field"
        }))
    ));
}

#[test]
fn config_rejects_zero_sample_fraction() {
    let dir = workspace();
    let path = write(dir.path(), "bad.toml", "[mining]\nsample_frac = 0.0\n");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "mining.sample_frac",
            ..
        }))
    ));
}

#[test]
fn disabled_filter_wins_over_overrides() {
    let dir = workspace();
    let path = write(
        dir.path(),
        "nofilter.toml",
        "[mining]\nitem_filter = false\ntop_k_items = 10\n",
    );
    let config = Config::load(&path).unwrap();
    assert_eq!(config.mining.job().policy, SupportPolicy::NoFilter);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = workspace();
    let path = write(dir.path(), "broken.toml", "[mining\nmin_support = ");
    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn missing_file_is_a_read_error() {
    let path = PathBuf::from("/nonexistent/mixtape.toml");
    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}
