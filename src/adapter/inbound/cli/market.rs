//! `markets` and `watch` commands.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use super::command::{MarketsArgs, WatchArgs};
use super::output;
use crate::adapter::outbound::ledger::LedgerClient;
use crate::application::cache::SyncState;
use crate::application::sync::PoolSyncService;
use crate::domain::market::volume_label;
use crate::domain::{MarketFallback, MarketFilter, MarketId, MarketPhase, MarketSummary, MarketView};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::{MarketDirectory, PoolReader};

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Market")]
    title: String,
    #[tabled(rename = "Options")]
    subtitle: String,
    #[tabled(rename = "Status")]
    phase: &'static str,
    #[tabled(rename = "Yes")]
    yes: String,
    #[tabled(rename = "No")]
    no: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Ends")]
    ends: String,
}

impl From<&MarketSummary> for MarketRow {
    fn from(summary: &MarketSummary) -> Self {
        Self {
            id: summary.market_id.to_string(),
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            phase: phase_label(summary.phase),
            yes: format!("{}%", summary.odds.yes_price()),
            no: format!("{}%", summary.odds.no_price()),
            volume: summary.volume_label.clone(),
            ends: summary
                .end_date
                .map_or_else(|| "-".into(), |date| date.format("%b %-d, %Y").to_string()),
        }
    }
}

const fn phase_label(phase: MarketPhase) -> &'static str {
    match phase {
        MarketPhase::Live => "live",
        MarketPhase::Upcoming => "upcoming",
        MarketPhase::Resolved => "resolved",
    }
}

/// Fetch and summarize the market directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub async fn summaries(
    directory: &dyn MarketDirectory,
    filter: MarketFilter,
    unit_symbol: &str,
) -> Result<Vec<MarketSummary>> {
    let listings = directory.list_markets(filter).await?;
    Ok(listings
        .into_iter()
        .map(|listing| MarketSummary::from_listing(listing, unit_symbol))
        .collect())
}

/// List markets.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub async fn list(config: &Config, args: &MarketsArgs) -> Result<()> {
    let client = LedgerClient::from_config(&config.ledger)?;
    let markets = summaries(&client, args.status.into(), &config.display.unit_symbol).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "markets",
            "markets": markets,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    if markets.is_empty() {
        output::warning("no markets found");
        return Ok(());
    }

    output::section(&format!("{} markets", markets.len()));
    let rows: Vec<MarketRow> = markets.iter().map(MarketRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    output::hint(&format!(
        "run {} to follow one",
        output::highlight("oddsync watch <id>")
    ));
    Ok(())
}

/// Observe a market and print every pool update until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the ledger client cannot be built.
pub async fn watch(config: &Config, args: &WatchArgs) -> Result<()> {
    let client = LedgerClient::from_config(&config.ledger)?;
    let reader: Arc<dyn PoolReader> = Arc::new(client);
    let service = PoolSyncService::new(reader, config.sync.pool_sync());

    let market_id = MarketId::new(args.market_id.as_str());
    let fallback = args
        .title
        .as_deref()
        .map_or_else(MarketFallback::default, MarketFallback::titled);

    // Subscribe before observing so the first fetch is not missed
    let mut updates = service.subscribe();
    let watch = service.observe(market_id.clone(), fallback);

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Market", &market_id);
    output::field(
        "Poll interval",
        format!("{}ms", config.sync.poll_interval_ms),
    );

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) if update.key == market_id => {
                    let entry = watch.get();
                    let view = service.market_view(&market_id);
                    report(update.state, &view, entry.error.as_ref().map(ToString::to_string), &config.display.unit_symbol);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Update receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    drop(watch);
    output::success("stopped watching");
    Ok(())
}

fn report(state: SyncState, view: &MarketView, error: Option<String>, unit_symbol: &str) {
    let timestamp = Utc::now().format("%H:%M:%S").to_string();

    if output::is_json() {
        output::json_output(json!({
            "command": "watch",
            "timestamp": timestamp,
            "state": state,
            "view": view,
            "error": error,
        }));
        return;
    }

    let message = match state {
        SyncState::Loading => output::muted("fetching"),
        SyncState::Error => output::negative(error.unwrap_or_default()),
        SyncState::Idle | SyncState::Ready => summary_line(view, unit_symbol),
    };
    let label = match state {
        SyncState::Idle => "idle",
        SyncState::Loading => "loading",
        SyncState::Ready => "ready",
        SyncState::Error => "error",
    };
    output::info(&timestamp, label, &message);
}

/// One line per update: prices, a share bar, staked amounts and volume.
fn summary_line(view: &MarketView, unit_symbol: &str) -> String {
    format!(
        "{} yes {}% / no {}%  [{}]  staked {:.2} / {:.2} {unit_symbol}  vol {}  traders {}{}",
        view.title,
        view.odds.yes_price(),
        view.odds.no_price(),
        share_bar(view.yes_share_pct),
        view.option_a_staked,
        view.option_b_staked,
        volume_label(view.volume, unit_symbol),
        view.traders,
        if view.is_live_data { "" } else { " (fallback)" },
    )
}

const SHARE_BAR_WIDTH: u32 = 20;

/// Split bar, `#` for the yes side and `-` for the no side.
fn share_bar(yes_share_pct: Decimal) -> String {
    let cells = (yes_share_pct * Decimal::from(SHARE_BAR_WIDTH) / Decimal::ONE_HUNDRED)
        .round()
        .to_u32()
        .unwrap_or(0)
        .min(SHARE_BAR_WIDTH);
    let yes = cells as usize;
    let no = (SHARE_BAR_WIDTH - cells) as usize;
    format!("{}{}", "#".repeat(yes), "-".repeat(no))
}
