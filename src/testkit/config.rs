//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::time::Duration;

use crate::application::sync::PoolSyncConfig;

/// Pool sync config that polls every `poll_ms` milliseconds.
pub fn pool_sync(poll_ms: u64) -> PoolSyncConfig {
    PoolSyncConfig {
        poll_interval: Duration::from_millis(poll_ms),
        update_channel_capacity: 64,
    }
}

/// Pool sync config whose poller only fires its initial tick in practice.
pub fn pool_sync_manual() -> PoolSyncConfig {
    pool_sync(3_600_000)
}

/// A minimal valid TOML configuration pointing at `api_url`.
pub fn toml_with_api(api_url: &str) -> String {
    format!(
        r#"
[logging]
level = "debug"
format = "pretty"

[ledger]
pool_api_url = "{api_url}"
indexer_url = "{api_url}"
"#
    )
}
