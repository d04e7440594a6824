//! Handler for the `recommend` command.

use std::sync::Arc;

use crate::cli::{output, Cli, RecommendArgs};
use crate::error::Result;
use crate::serving::{FileSnapshot, ModelStore, RecommendRequest, RecommendService, Reloader};

/// Answer a query offline, with the same semantics as the HTTP endpoint.
#[allow(clippy::result_large_err)]
pub fn execute(cli: &Cli, args: &RecommendArgs) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(ref model) = args.model {
        config.serving.model_path = model.clone();
    }
    if let Some(max_results) = args.max_results {
        config.serving.max_results = max_results;
    }
    config.validate()?;
    config.logging.init();

    let reloader = Reloader::from_file(
        Arc::new(ModelStore::new()),
        FileSnapshot::new(&config.serving.model_path),
    );
    let service = RecommendService::new(Arc::new(reloader))
        .with_version(&config.serving.version)
        .with_max_results(config.serving.max_results);

    let response = service.recommend(&RecommendRequest::new(args.songs.iter().cloned()))?;

    if output::is_json() {
        output::json_output(serde_json::to_value(&response)?);
        return Ok(());
    }

    output::field("model date", &response.model_date);
    if response.songs.is_empty() {
        output::note("no rule matches these tracks");
        return Ok(());
    }
    output::section("Recommendations");
    for (rank, song) in response.songs.iter().enumerate() {
        output::field(&format!("{}", rank + 1), song);
    }
    Ok(())
}
