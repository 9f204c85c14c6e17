//! `positions` command.

use std::sync::Arc;

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::PositionsArgs;
use super::output;
use crate::adapter::outbound::ledger::LedgerClient;
use crate::application::sync::PredictionLedgerSync;
use crate::domain::money::round_display;
use crate::domain::{Position, PositionResult, PositionTab, UserId};
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::PredictionIndexer;

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Result")]
    result: &'static str,
}

impl From<&Position> for PositionRow {
    fn from(position: &Position) -> Self {
        Self {
            market: position.record.pool_name.clone(),
            outcome: position.record.outcome.label(),
            amount: format!("${:.2}", round_display(position.record.amount_usd)),
            result: match position.result {
                None => "open",
                Some(PositionResult::Won) => "won",
                Some(PositionResult::Lost) => "lost",
            },
        }
    }
}

/// Load a user's predictions and print one tab of their portfolio.
///
/// # Errors
///
/// Returns an error if the indexer cannot be reached.
pub async fn show(config: &Config, args: &PositionsArgs) -> Result<()> {
    let client = LedgerClient::from_config(&config.ledger)?;
    let indexer: Arc<dyn PredictionIndexer> = Arc::new(client);
    let sync = PredictionLedgerSync::new(indexer, config.sync.update_channel_capacity);

    let user_id = UserId::new(args.user_id.as_str());
    let entry = sync.resync(&user_id).await;
    if let (None, Some(err)) = (&entry.data, &entry.error) {
        return Err(Error::Network(err.to_string()));
    }

    let book = sync.position_book(&user_id);
    let stats = book.stats();
    let tab = args.tab();
    let positions = book.search(tab, args.search.as_deref().unwrap_or_default());

    if output::is_json() {
        output::json_output(json!({
            "command": "positions",
            "user_id": user_id.as_str(),
            "stats": stats,
            "tab": tab_name(tab),
            "positions": positions,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Portfolio");
    output::field("Total value", format!("${:.2}", round_display(stats.total_value)));
    output::field("Trades", stats.total_trades);
    output::field("Active", stats.active_positions);
    output::field("Closed", stats.closed_positions);

    output::section(&format!("{} positions", tab_name(tab)));
    if positions.is_empty() {
        output::warning("no positions");
        return Ok(());
    }
    let rows: Vec<PositionRow> = positions.into_iter().map(PositionRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

const fn tab_name(tab: PositionTab) -> &'static str {
    match tab {
        PositionTab::Active => "active",
        PositionTab::Closed => "closed",
    }
}
