//! Periodic re-assertion of `online` for connected users.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use sessionhub_core::error::AppError;

use super::service::UsageAccountingService;

/// One user whose heartbeat could not be recorded.
#[derive(Debug, Clone)]
pub struct HeartbeatFailure {
    /// The user that failed.
    pub user_id: i64,
    /// Why it failed.
    pub error: AppError,
}

/// Outcome of one heartbeat scan.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatReport {
    /// Connected users found by the scan.
    pub scanned: usize,
    /// Users whose `online` event was recorded.
    pub succeeded: usize,
    /// Users whose `online` event failed, ordered by user id.
    pub failures: Vec<HeartbeatFailure>,
}

impl HeartbeatReport {
    /// Whether every scanned user was recorded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Shortest period the heartbeat ticks at.
pub const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Runs [`UsageAccountingService::mark_all_connected_online`] on an interval.
#[derive(Debug)]
pub struct HeartbeatTask {
    usage: Arc<UsageAccountingService>,
    interval: Duration,
}

impl HeartbeatTask {
    /// Create a heartbeat task. Intervals below [`MIN_HEARTBEAT_INTERVAL`]
    /// are raised to it.
    pub fn new(usage: Arc<UsageAccountingService>, interval: Duration) -> Self {
        Self {
            usage,
            interval: clamp_interval(interval),
        }
    }

    /// Run until the shutdown flag flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_seconds = self.interval.as_secs(), "Heartbeat task started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.usage.mark_all_connected_online().await {
                        error!(error = %e, "Heartbeat scan failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Heartbeat task stopped");
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    interval.max(MIN_HEARTBEAT_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_interval_task_runs_until_shutdown() {
        use sessionhub_core::config::UsageConfig;
        use sessionhub_database::repositories::{UsageRepository, UserRepository};
        use sqlx::postgres::PgPoolOptions;

        // Nothing listens here, so every scan fails fast.
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://sessionhub@127.0.0.1:1/unreachable")
            .unwrap();
        let usage = Arc::new(UsageAccountingService::new(
            Arc::new(UsageRepository::new(pool.clone())),
            Arc::new(UserRepository::new(pool)),
            UsageConfig::default(),
        ));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(HeartbeatTask::new(usage, Duration::ZERO).run(rx));

        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(true).unwrap();

        let joined = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("heartbeat task did not stop");
        assert!(joined.is_ok());
    }

    #[test]
    fn test_zero_interval_clamped() {
        assert_eq!(clamp_interval(Duration::ZERO), MIN_HEARTBEAT_INTERVAL);
        assert_eq!(clamp_interval(Duration::from_millis(250)), MIN_HEARTBEAT_INTERVAL);
        assert_eq!(
            clamp_interval(Duration::from_secs(60)),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_report_is_clean() {
        let mut report = HeartbeatReport {
            scanned: 2,
            succeeded: 2,
            failures: Vec::new(),
        };
        assert!(report.is_clean());

        report.succeeded = 1;
        report.failures.push(HeartbeatFailure {
            user_id: 7,
            error: AppError::connectivity("commit failed"),
        });
        assert!(!report.is_clean());
    }
}
