//! Nightwatch CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nightwatch::cli::{Cli, Commands};
use nightwatch::infrastructure::config::ConfigLoader;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            nightwatch::cli::handle_error(err, cli.json);
            return;
        }
    };

    let result = match cli.command {
        Commands::Collect(args) => {
            nightwatch::cli::commands::collect::execute(&config, args, cli.json).await
        }
        Commands::Summary(args) => {
            nightwatch::cli::commands::summary::execute(&config, args, cli.json).await
        }
        Commands::Trend(args) => {
            nightwatch::cli::commands::trend::execute(&config, args, cli.json).await
        }
        Commands::Dates(args) => {
            nightwatch::cli::commands::dates::execute(&config, args, cli.json).await
        }
    };

    if let Err(err) = result {
        nightwatch::cli::handle_error(err, cli.json);
    }
}
