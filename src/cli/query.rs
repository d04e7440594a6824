//! Handler for the `query` command.

use crate::cli::{output, Cli, QueryArgs};
use crate::error::{Error, Result};
use crate::serving::{RecommendRequest, RecommendResponse};

/// POST the tracks to a running server and print its answer.
pub async fn execute(cli: &Cli, args: &QueryArgs) -> Result<()> {
    let url = match args.url {
        Some(ref url) => url.clone(),
        None => {
            let config = cli.load_config()?;
            format!("http://localhost:{}/api/recommend", config.serving.port)
        }
    };

    let spinner = output::spinner(&format!("querying {url}"));
    let response = match reqwest::Client::new()
        .post(&url)
        .json(&RecommendRequest::new(args.songs.iter().cloned()))
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            output::spinner_fail(&spinner, "could not reach the server");
            return Err(e.into());
        }
    };

    let status = response.status();
    if !status.is_success() {
        output::spinner_fail(&spinner, &format!("server responded {status}"));
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("no error message")
            .to_string();
        return Err(Error::Remote {
            status: status.as_u16(),
            message,
        });
    }

    let body: RecommendResponse = response.json().await?;
    output::spinner_success(&spinner, &format!("{} tracks", body.songs.len()));

    if output::is_json() {
        output::json_output(serde_json::to_value(&body)?);
        return Ok(());
    }
    output::field("version", &body.version);
    output::field("model date", &body.model_date);
    for (rank, song) in body.songs.iter().enumerate() {
        output::field(&format!("{}", rank + 1), song);
    }
    Ok(())
}
