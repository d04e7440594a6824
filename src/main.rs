use clap::Parser;
use mixtape::cli::output::{self, OutputConfig};
use mixtape::cli::{check, inspect, mine, query, recommend, serve, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let result = match &cli.command {
        Commands::Mine(args) => mine::execute(&cli, args),
        Commands::Serve(args) => serve::execute(&cli, args).await,
        Commands::Recommend(args) => recommend::execute(&cli, args),
        Commands::Query(args) => query::execute(&cli, args).await,
        Commands::Inspect(args) => inspect::execute(&cli, args),
        Commands::Check => check::execute(&cli),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
