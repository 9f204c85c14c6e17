//! `odds` and `preview` commands.

use serde_json::json;

use super::command::{OddsArgs, PreviewArgs};
use super::output;
use crate::adapter::outbound::ledger::LedgerClient;
use crate::domain::{preview_input, try_odds, MarketId, OddsResult, OrderPreview, StakePool};
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::PoolReader;

/// Print the implied prices of a pool.
///
/// # Errors
///
/// Returns a domain error for negative stakes.
pub fn odds(args: &OddsArgs) -> Result<()> {
    let odds = try_odds(args.stakes_a, args.stakes_b)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "odds",
            "yes_price": odds.yes_price(),
            "no_price": odds.no_price(),
        }));
        return Ok(());
    }

    print_odds(odds);
    Ok(())
}

/// Preview an order against literal stakes or a market's current pool.
///
/// # Errors
///
/// Returns an error for an unparseable amount or when the pool cannot be read.
pub async fn preview(config: &Config, args: &PreviewArgs) -> Result<()> {
    let (stakes_a, stakes_b) = match (&args.market, args.stakes.as_deref()) {
        (_, Some(&[a, b])) => (a, b),
        (Some(market_id), _) => {
            let pool = read_pool(config, &MarketId::new(market_id.as_str())).await?;
            if !pool.status().accepts_stakes() {
                output::warning(&format!(
                    "market {} is {} and no longer accepts stakes",
                    market_id,
                    pool.status().as_str()
                ));
            }
            (pool.option_a_stakes().value(), pool.option_b_stakes().value())
        }
        _ => return Err(Error::Parse("either --market or --stakes A B is required".into())),
    };

    let Some(preview) = preview_input(&args.amount, args.outcome, stakes_a, stakes_b)? else {
        output::warning("enter a positive amount to see a preview");
        return Ok(());
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "preview",
            "outcome": preview.outcome,
            "amount": preview.amount,
            "exact": preview,
            "display": preview.display(),
        }));
        return Ok(());
    }

    print_preview(&preview);
    Ok(())
}

async fn read_pool(config: &Config, market_id: &MarketId) -> Result<StakePool> {
    let client = LedgerClient::from_config(&config.ledger)?;
    let reading = client.fetch_pool(market_id).await?;
    Ok(StakePool::try_from(reading)?)
}

fn print_odds(odds: OddsResult) {
    output::field("Yes", format!("{}%", odds.yes_price()));
    output::field("No", format!("{}%", odds.no_price()));
}

fn print_preview(preview: &OrderPreview) {
    let shown = preview.display();
    output::section(&format!("Buy {} for {}", preview.outcome, preview.amount));
    output::field("Odds", format!("{}x", shown.odds));
    output::field("Avg price", format!("{}¢", shown.avg_price));
    output::field("Shares", shown.shares);
    output::field("Potential return", shown.potential_return);
    let profit = if preview.is_profitable() {
        output::positive(format!("+{}", shown.profit))
    } else {
        output::negative(shown.profit)
    };
    output::field("Profit", profit);
}
