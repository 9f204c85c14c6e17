use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use oddsync::adapter::inbound::cli::command::Cli;
use oddsync::adapter::inbound::cli::output::{self, OutputConfig};
use oddsync::adapter::inbound::cli::dispatch::execute;
use oddsync::infrastructure::config::settings::Config;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %err, "Command failed");
        output::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    config.init_logging();
    debug!(config = %cli.config.display(), "Configuration loaded");

    execute(&cli, &config).await?;
    Ok(())
}
