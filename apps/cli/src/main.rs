mod blob;
mod cli;
mod client;
mod commands;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info,ethfs=debug" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load().unwrap_or_default();
    commands::run(cli.command, &config).await
}
