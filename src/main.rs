use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use runeswap::application::{Cli, CommandExecutor};
use runeswap::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: CLI flags > config file > defaults
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load_config()?,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
