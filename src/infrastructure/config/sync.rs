//! Sync service configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::sync::PoolSyncConfig;

/// Polling and notification settings for the sync services.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Interval between polls of an observed market, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Capacity of each service's update broadcast channel.
    #[serde(default = "default_update_channel_capacity")]
    pub update_channel_capacity: usize,
}

const fn default_poll_interval_ms() -> u64 {
    10_000
}

const fn default_update_channel_capacity() -> usize {
    256
}

impl SyncConfig {
    #[must_use]
    pub fn pool_sync(&self) -> PoolSyncConfig {
        PoolSyncConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            update_channel_capacity: self.update_channel_capacity,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            update_channel_capacity: default_update_channel_capacity(),
        }
    }
}
