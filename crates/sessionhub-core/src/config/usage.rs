//! Usage accounting configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Usage accounting and heartbeat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Upper bound in milliseconds for one usage transaction.
    #[serde(default = "default_transaction_timeout")]
    pub transaction_timeout_ms: u64,
    /// Interval between heartbeat scans in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Maximum number of per-user heartbeat transactions in flight.
    #[serde(default = "default_heartbeat_concurrency")]
    pub heartbeat_concurrency: usize,
}

impl UsageConfig {
    /// Transaction timeout as a [`Duration`].
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }

    /// Heartbeat interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    /// Reject settings that cannot drive a timer or a fan-out.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.transaction_timeout_ms == 0 {
            return Err(AppError::configuration(
                "usage.transaction_timeout_ms must be greater than 0",
            ));
        }
        if self.heartbeat_interval_seconds == 0 {
            return Err(AppError::configuration(
                "usage.heartbeat_interval_seconds must be greater than 0",
            ));
        }
        if self.heartbeat_concurrency == 0 {
            return Err(AppError::configuration(
                "usage.heartbeat_concurrency must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            transaction_timeout_ms: default_transaction_timeout(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            heartbeat_concurrency: default_heartbeat_concurrency(),
        }
    }
}

fn default_transaction_timeout() -> u64 {
    5_000
}

fn default_heartbeat_interval() -> u64 {
    60
}

fn default_heartbeat_concurrency() -> usize {
    8
}
