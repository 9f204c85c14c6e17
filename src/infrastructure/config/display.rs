//! Display settings.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Currency symbol appended to amounts, e.g. in volume labels.
    #[serde(default = "default_unit_symbol")]
    pub unit_symbol: String,
}

fn default_unit_symbol() -> String {
    "ALEO".into()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            unit_symbol: default_unit_symbol(),
        }
    }
}
