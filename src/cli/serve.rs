//! Handler for the `serve` command.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::cli::{output, Cli, ServeArgs};
use crate::error::Result;
use crate::serving::{self, FileSnapshot, ModelStore, RecommendService, ReloadOutcome, Reloader};

/// Execute the serve command. Runs until Ctrl-C.
pub async fn execute(cli: &Cli, args: &ServeArgs) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(ref model) = args.model {
        config.serving.model_path = model.clone();
    }
    if let Some(ref host) = args.host {
        config.serving.host = host.clone();
    }
    if let Some(port) = args.port {
        config.serving.port = port;
    }
    if let Some(max_results) = args.max_results {
        config.serving.max_results = max_results;
    }
    config.validate()?;
    config.logging.init();

    let settings = &config.serving;
    let store = Arc::new(ModelStore::new());
    let reloader = Arc::new(Reloader::from_file(
        store,
        FileSnapshot::new(&settings.model_path),
    ));

    match reloader.maybe_reload() {
        Ok(ReloadOutcome::Reloaded(model)) => info!(
            path = %settings.model_path.display(),
            rules = model.index().rule_count(),
            model_date = %model.snapshot().metadata().model_date(),
            "initial model loaded"
        ),
        Ok(ReloadOutcome::Unchanged) => {}
        Err(e) => warn!(
            path = %settings.model_path.display(),
            error = %e,
            "starting without a model"
        ),
    }

    let service = Arc::new(
        RecommendService::new(reloader)
            .with_version(&settings.version)
            .with_max_results(settings.max_results),
    );

    let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("model", settings.model_path.display());
    output::field("listening", output::highlight(listener.local_addr()?));

    serving::serve(listener, service, async {
        let _ = signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await?;

    info!("mixtape stopped");
    Ok(())
}
