//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{MarketFilter, Outcome, PositionTab};

/// Parimutuel odds, order previews and live pool views for prediction markets
#[derive(Parser, Debug)]
#[command(name = "oddsync")]
#[command(version)]
pub struct Cli {
    /// Configuration file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the oddsync CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Implied prices for a pool's stakes
    Odds(OddsArgs),

    /// Preview an order against a pool
    Preview(PreviewArgs),

    /// List markets from the directory
    Markets(MarketsArgs),

    /// Follow a market's pool until interrupted
    Watch(WatchArgs),

    /// Show a user's portfolio
    Positions(PositionsArgs),
}

/// Arguments for `oddsync odds`.
#[derive(Args, Debug)]
#[command(allow_negative_numbers = true)]
pub struct OddsArgs {
    /// Option A (yes) stake in microunits
    pub stakes_a: i128,
    /// Option B (no) stake in microunits
    pub stakes_b: i128,
}

/// Arguments for `oddsync preview`.
#[derive(Args, Debug)]
#[command(allow_negative_numbers = true)]
pub struct PreviewArgs {
    /// Amount to stake, in display units
    #[arg(long)]
    pub amount: String,

    /// Outcome to buy [yes, no]
    #[arg(long, value_parser = parse_outcome)]
    pub outcome: Outcome,

    /// Read the pool of this market from the ledger
    #[arg(long, required_unless_present = "stakes", conflicts_with = "stakes")]
    pub market: Option<String>,

    /// Use these option A and option B stakes (microunits) instead
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub stakes: Option<Vec<u64>>,
}

/// Arguments for `oddsync markets`.
#[derive(Args, Debug)]
pub struct MarketsArgs {
    /// Which markets to list
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    pub status: StatusFilter,
}

/// Status filter accepted by `oddsync markets`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Locked,
}

impl From<StatusFilter> for MarketFilter {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => Self::All,
            StatusFilter::Pending => Self::Pending,
            StatusFilter::Locked => Self::Locked,
        }
    }
}

/// Arguments for `oddsync watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Market to observe
    pub market_id: String,

    /// Title shown until the ledger answers
    #[arg(long)]
    pub title: Option<String>,
}

/// Arguments for `oddsync positions`.
#[derive(Args, Debug)]
pub struct PositionsArgs {
    /// Address whose predictions to load
    pub user_id: String,

    /// Show closed positions instead of active ones
    #[arg(long)]
    pub closed: bool,

    /// Only positions whose market name or outcome contains this text
    #[arg(long)]
    pub search: Option<String>,
}

impl PositionsArgs {
    #[must_use]
    pub fn tab(&self) -> PositionTab {
        if self.closed {
            PositionTab::Closed
        } else {
            PositionTab::Active
        }
    }
}

fn parse_outcome(raw: &str) -> Result<Outcome, String> {
    raw.parse().map_err(|err: crate::domain::DomainError| err.to_string())
}
