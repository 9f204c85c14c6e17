//! Wire types of the ledger read APIs.
//!
//! Ledger integers arrive either as JSON numbers or as decimal strings
//! (`"1500000"`, sometimes with a `u64` suffix). Missing and null values
//! read as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::domain::{
    MarketId, MarketListing, Outcome, PoolReading, PoolStatus, PredictionId, PredictionRecord,
    PredictionStatus,
};
use crate::error::{Error, Result};

/// `GET /pools/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolResponse {
    #[serde(default, alias = "id", alias = "pool_id")]
    pub market_id: Option<String>,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub option_a_stakes: i128,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub option_b_stakes: i128,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub total_staked: i128,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub total_no_of_stakes: i128,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub deadline: i128,
}

impl PoolResponse {
    /// Convert to a reading for `requested`. A response that omits its own
    /// market id is taken to be for the requested one.
    pub fn into_reading(self, requested: &MarketId) -> Result<PoolReading> {
        Ok(PoolReading {
            market_id: self
                .market_id
                .map_or_else(|| requested.clone(), MarketId::new),
            option_a_stakes: self.option_a_stakes,
            option_b_stakes: self.option_b_stakes,
            total_staked: self.total_staked,
            total_stake_count: self.total_no_of_stakes,
            status: self.status,
            deadline: to_deadline(self.deadline)?,
        })
    }
}

/// One entry of `GET /markets`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketResponse {
    #[serde(alias = "id")]
    pub market_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_option_a_label")]
    pub option_a_label: String,
    #[serde(default = "default_option_b_label")]
    pub option_b_label: String,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub option_a_stakes: i128,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub option_b_stakes: i128,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub total_staked: i128,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de_ledger_int")]
    pub deadline: i128,
    #[serde(default)]
    pub metric_type: String,
    #[serde(default)]
    pub threshold: String,
}

fn default_option_a_label() -> String {
    "YES".into()
}

fn default_option_b_label() -> String {
    "NO".into()
}

impl MarketResponse {
    pub fn into_listing(self) -> Result<MarketListing> {
        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<PoolStatus>() {
                Ok(status) => Some(status),
                Err(reason) => {
                    warn!(market_id = %self.market_id, %reason, "Ignoring market status");
                    None
                }
            },
        };

        Ok(MarketListing {
            option_a_stakes: to_amount("option_a_stakes", self.option_a_stakes)?,
            option_b_stakes: to_amount("option_b_stakes", self.option_b_stakes)?,
            total_staked: to_amount("total_staked", self.total_staked)?,
            deadline: to_deadline(self.deadline)?,
            market_id: MarketId::new(self.market_id),
            title: self.title,
            description: self.description,
            option_a_label: self.option_a_label,
            option_b_label: self.option_b_label,
            status,
            metric_type: self.metric_type,
            threshold: self.threshold,
        })
    }
}

/// `GET /markets` answers with a bare list or a wrapped one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MarketsResponse {
    List(Vec<MarketResponse>),
    Wrapped { markets: Vec<MarketResponse> },
}

impl MarketsResponse {
    #[must_use]
    pub fn into_inner(self) -> Vec<MarketResponse> {
        match self {
            Self::List(markets) | Self::Wrapped { markets } => markets,
        }
    }
}

/// One record of `GET /predictions?user=...`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub id: String,
    pub pool_id: String,
    #[serde(default)]
    pub pool_name: String,
    pub outcome: Outcome,
    pub amount_usd: Decimal,
    pub status: PredictionStatus,
}

impl From<PredictionResponse> for PredictionRecord {
    fn from(r: PredictionResponse) -> Self {
        Self {
            id: PredictionId::new(r.id),
            pool_id: MarketId::new(r.pool_id),
            pool_name: r.pool_name,
            outcome: r.outcome,
            amount_usd: r.amount_usd,
            status: r.status,
        }
    }
}

/// The indexer answers with a bare list or a wrapped one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PredictionsResponse {
    List(Vec<PredictionResponse>),
    Wrapped { predictions: Vec<PredictionResponse> },
}

impl PredictionsResponse {
    #[must_use]
    pub fn into_records(self) -> Vec<PredictionRecord> {
        match self {
            Self::List(records) | Self::Wrapped { predictions: records } => {
                records.into_iter().map(PredictionRecord::from).collect()
            }
        }
    }
}

fn to_amount(field: &str, value: i128) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::Parse(format!("{field} out of range: {value}")))
}

fn to_deadline(value: i128) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::Parse(format!("deadline out of range: {value}")))
}

/// Deserialize a ledger integer given as a number, a numeric string or null.
fn de_ledger_int<'de, D>(deserializer: D) -> std::result::Result<i128, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct LedgerIntVisitor;

    impl<'de> de::Visitor<'de> for LedgerIntVisitor {
        type Value = i128;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("an integer, a string containing an integer, or null")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
            Ok(i128::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
            Ok(i128::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            let digits = v.trim();
            let digits = digits.strip_suffix("u64").unwrap_or(digits);
            if digits.is_empty() {
                return Ok(0);
            }
            digits.parse::<i128>().map_err(de::Error::custom)
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(0)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(LedgerIntVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pool_accepts_strings_and_numbers() {
        let json = r#"{
            "option_a_stakes": "700",
            "option_b_stakes": 300,
            "total_staked": "1000u64",
            "total_no_of_stakes": "4",
            "status": "pending",
            "deadline": "1767225600"
        }"#;
        let response: PoolResponse = serde_json::from_str(json).unwrap();
        let reading = response.into_reading(&MarketId::new("m1")).unwrap();

        assert_eq!(reading.market_id, MarketId::new("m1"));
        assert_eq!(reading.option_a_stakes, 700);
        assert_eq!(reading.option_b_stakes, 300);
        assert_eq!(reading.total_staked, 1000);
        assert_eq!(reading.total_stake_count, 4);
        assert_eq!(reading.deadline, 1_767_225_600);
    }

    #[test]
    fn pool_missing_and_null_values_read_as_zero() {
        let json = r#"{"option_a_stakes": null, "status": "locked"}"#;
        let response: PoolResponse = serde_json::from_str(json).unwrap();
        let reading = response.into_reading(&MarketId::new("m1")).unwrap();

        assert_eq!(reading.option_a_stakes, 0);
        assert_eq!(reading.option_b_stakes, 0);
        assert_eq!(reading.deadline, 0);
    }

    #[test]
    fn pool_keeps_reported_market_id() {
        let json = r#"{"id": "other", "status": "pending"}"#;
        let response: PoolResponse = serde_json::from_str(json).unwrap();
        let reading = response.into_reading(&MarketId::new("m1")).unwrap();
        assert_eq!(reading.market_id, MarketId::new("other"));
    }

    #[test]
    fn negative_stakes_pass_through_for_validation() {
        let json = r#"{"option_a_stakes": "-5", "status": "pending"}"#;
        let response: PoolResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.option_a_stakes, -5);
    }

    #[test]
    fn garbage_integer_is_rejected() {
        let json = r#"{"option_a_stakes": "lots"}"#;
        assert!(serde_json::from_str::<PoolResponse>(json).is_err());
    }

    #[test]
    fn markets_accept_wrapped_list() {
        let json = r#"{"markets": [{
            "market_id": "42field",
            "title": "BTC above 100k",
            "option_a_label": "Above",
            "option_b_label": "Below",
            "option_a_stakes": "2000000",
            "status": "locked",
            "metric_type": "btc_price",
            "threshold": "100000"
        }]}"#;
        let markets: MarketsResponse = serde_json::from_str(json).unwrap();
        let listing = markets.into_inner().remove(0).into_listing().unwrap();

        assert_eq!(listing.market_id, MarketId::new("42field"));
        assert_eq!(listing.option_a_stakes, 2_000_000);
        assert_eq!(listing.option_b_stakes, 0);
        assert_eq!(listing.status, Some(PoolStatus::Locked));
        assert_eq!(listing.option_a_label, "Above");
    }

    #[test]
    fn unknown_market_status_is_dropped() {
        let json = r#"[{"id": "m", "status": "cancelled"}]"#;
        let markets: MarketsResponse = serde_json::from_str(json).unwrap();
        let listing = markets.into_inner().remove(0).into_listing().unwrap();
        assert_eq!(listing.status, None);
        assert_eq!(listing.option_a_label, "YES");
    }

    #[test]
    fn negative_listing_stake_is_parse_error() {
        let json = r#"[{"id": "m", "total_staked": -1}]"#;
        let markets: MarketsResponse = serde_json::from_str(json).unwrap();
        let result = markets.into_inner().remove(0).into_listing();
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn predictions_parse_camel_case_records() {
        let json = r#"[
            {"id": "p1", "poolId": "m1", "poolName": "Rain", "outcome": "Yes", "amountUsd": 12.5, "status": "active"},
            {"id": "p2", "poolId": "m2", "poolName": "Snow", "outcome": "No", "amountUsd": "3", "status": "lost"}
        ]"#;
        let records = serde_json::from_str::<PredictionsResponse>(json)
            .unwrap()
            .into_records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, Outcome::Yes);
        assert_eq!(records[0].amount_usd, dec!(12.5));
        assert_eq!(records[1].status, PredictionStatus::Lost);
        assert_eq!(records[1].pool_id, MarketId::new("m2"));
    }

    #[test]
    fn predictions_accept_wrapped_list() {
        let json = r#"{"predictions": []}"#;
        let records = serde_json::from_str::<PredictionsResponse>(json)
            .unwrap()
            .into_records();
        assert!(records.is_empty());
    }
}
