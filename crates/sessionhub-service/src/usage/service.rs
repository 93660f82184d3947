//! Usage accounting service.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use sessionhub_core::config::UsageConfig;
use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_database::repositories::{UsageRepository, UserRepository};
use sessionhub_entity::usage::{UsageEvent, UserDailyUsage};

use super::heartbeat::{HeartbeatFailure, HeartbeatReport};

/// Records session events into the per-user daily ledger.
#[derive(Debug, Clone)]
pub struct UsageAccountingService {
    /// Ledger repository.
    usage_repo: Arc<UsageRepository>,
    /// User repository, used by the heartbeat scan.
    user_repo: Arc<UserRepository>,
    /// Timeouts and heartbeat tuning.
    config: UsageConfig,
}

impl UsageAccountingService {
    /// Creates a new usage accounting service.
    pub fn new(
        usage_repo: Arc<UsageRepository>,
        user_repo: Arc<UserRepository>,
        config: UsageConfig,
    ) -> Self {
        Self {
            usage_repo,
            user_repo,
            config,
        }
    }

    /// Records an event given by its wire tag.
    ///
    /// Unknown tags fail with `UnsupportedEvent` before the store is touched.
    pub async fn record_event(&self, user_id: i64, tag: &str) -> AppResult<UserDailyUsage> {
        let event: UsageEvent = tag.parse()?;
        self.record(user_id, event).await
    }

    /// Records an event given by its wire tag against the local day of `now`.
    pub async fn record_event_at(
        &self,
        user_id: i64,
        tag: &str,
        now: DateTime<Local>,
    ) -> AppResult<UserDailyUsage> {
        let event: UsageEvent = tag.parse()?;
        self.record_at(user_id, event, now).await
    }

    /// Records an event against today's row.
    pub async fn record(&self, user_id: i64, event: UsageEvent) -> AppResult<UserDailyUsage> {
        self.record_at(user_id, event, Local::now()).await
    }

    /// Records an event against the row for the local day of `now`.
    ///
    /// The statements must finish within the configured timeout; otherwise
    /// the transaction is rolled back and the call fails as a connectivity
    /// error. A timed-out call never leaves a committed write behind, so it
    /// is safe to retry.
    pub async fn record_at(
        &self,
        user_id: i64,
        event: UsageEvent,
        now: DateTime<Local>,
    ) -> AppResult<UserDailyUsage> {
        self.usage_repo
            .record(user_id, event, now, self.config.transaction_timeout())
            .await
    }

    /// Re-asserts `online` for every connected user.
    ///
    /// Each user is recorded in its own transaction. A failure for one user
    /// is collected in the report and never stops the scan; only a failure
    /// to list the connected users is returned as an error.
    pub async fn mark_all_connected_online(&self) -> AppResult<HeartbeatReport> {
        let users = self.user_repo.find_all_connected().await?;
        let scanned = users.len();
        let concurrency = self.config.heartbeat_concurrency.max(1);

        let results: Vec<(i64, AppResult<UserDailyUsage>)> = stream::iter(users)
            .map(|user| async move { (user.id, self.record(user.id, UsageEvent::Online).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut failures = Vec::new();
        for (user_id, result) in results {
            if let Err(error) = result {
                warn!(user_id, error = %error, "Failed to record heartbeat");
                failures.push(HeartbeatFailure { user_id, error });
            }
        }
        failures.sort_by_key(|f| f.user_id);

        let report = HeartbeatReport {
            scanned,
            succeeded: scanned - failures.len(),
            failures,
        };

        info!(
            scanned = report.scanned,
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "Heartbeat scan complete"
        );

        Ok(report)
    }

    /// Returns a user's row for one day, if any event was recorded.
    pub async fn usage_for_day(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> AppResult<Option<UserDailyUsage>> {
        self.usage_repo.find_for_day(user_id, day).await
    }

    /// Returns a user's rows between two days inclusive.
    pub async fn usage_between(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<UserDailyUsage>> {
        if from > to {
            return Err(AppError::validation(format!(
                "Invalid range: {from} is after {to}"
            )));
        }
        self.usage_repo.find_between(user_id, from, to).await
    }
}
