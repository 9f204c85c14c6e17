//! Command dispatch.

use super::command::{Cli, Commands};
use super::{market, odds, position};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Run the parsed command with `config`.
///
/// # Errors
///
/// Returns whatever error the command handler reports.
pub async fn execute(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Odds(args) => odds::odds(args),
        Commands::Preview(args) => odds::preview(config, args).await,
        Commands::Markets(args) => market::list(config, args).await,
        Commands::Watch(args) => market::watch(config, args).await,
        Commands::Positions(args) => position::show(config, args).await,
    }
}
