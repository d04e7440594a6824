//! Handler for the `check` command.

use crate::cli::{output, Cli};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::Result;

/// Validate configuration without mining or serving.
#[allow(clippy::result_large_err)]
pub fn execute(cli: &Cli) -> Result<()> {
    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| format!("{DEFAULT_CONFIG_FILE} (or defaults)"));

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("config", &source);

    let config: Config = cli.load_config()?;
    output::success("configuration is valid");

    output::section("Mining");
    let mining = &config.mining;
    let job = mining.job();
    output::field("columns", format!("{} / {}", mining.transaction_field, mining.item_field));
    output::field("min support", mining.min_support);
    output::field("min confidence", mining.min_confidence);
    output::field("item filter", &job.policy);
    output::field(
        "max playlist",
        job.max_transaction_len
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
    );
    output::field("output", mining.output.display());
    for input in &mining.inputs {
        if input.is_file() {
            output::field("input", input.display());
        } else {
            output::warning(&format!("input not found: {}", input.display()));
        }
    }

    output::section("Serving");
    let serving = &config.serving;
    output::field("listen", format!("{}:{}", serving.host, serving.port));
    output::field("max results", serving.max_results);
    if serving.model_path.is_file() {
        output::field("model", serving.model_path.display());
    } else {
        output::warning(&format!(
            "model not found: {} (server will answer 503 until it appears)",
            serving.model_path.display()
        ));
    }

    output::section("Logging");
    output::field("level", &config.logging.level);
    output::field("format", &config.logging.format);
    Ok(())
}
