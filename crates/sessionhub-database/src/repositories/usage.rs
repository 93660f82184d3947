//! Daily usage ledger repository.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use sessionhub_core::error::{AppError, ErrorKind};
use sessionhub_core::result::AppResult;
use sessionhub_entity::usage::{UsageEvent, UserDailyUsage};

/// Repository for the per-user, per-day usage ledger.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    pool: PgPool,
}

impl UsageRepository {
    /// Create a new usage repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply one event to the user's row for the local day of `now`.
    ///
    /// Runs in a single transaction: the row for `(user_id, day)` is created
    /// if missing (`ON CONFLICT DO NOTHING` on the unique key), locked with
    /// `FOR UPDATE`, then updated in SQL. Concurrent callers for the same
    /// key serialize on the unique index and the row lock, so neither a
    /// duplicate row nor a lost increment is possible. Any failure before
    /// commit drops the transaction, which rolls it back.
    ///
    /// `deadline` bounds the statements before `COMMIT`. When it elapses the
    /// transaction is rolled back and the call fails with a connectivity
    /// error, so a retry never double-counts. The commit itself is not
    /// bounded: once it has been sent, its outcome is always reported.
    pub async fn record(
        &self,
        user_id: i64,
        event: UsageEvent,
        now: DateTime<Local>,
        deadline: Duration,
    ) -> AppResult<UserDailyUsage> {
        let day = now.date_naive();
        let at = now.with_timezone(&Utc);

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Connectivity,
                "Failed to begin usage transaction",
                e,
            )
        })?;

        let updated = tokio::time::timeout(deadline, apply(&mut tx, user_id, event, day, at))
            .await
            .map_err(|_| {
                AppError::connectivity(format!(
                    "Usage transaction for user {user_id} ('{event}') exceeded {}ms",
                    deadline.as_millis()
                ))
            })??;

        tx.commit().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Connectivity,
                "Failed to commit usage transaction",
                e,
            )
        })?;

        debug!(user_id, %event, date = %day, row_id = updated.id, "Recorded usage event");
        Ok(updated)
    }

    /// Find the row for one user and day.
    pub async fn find_for_day(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> AppResult<Option<UserDailyUsage>> {
        sqlx::query_as::<_, UserDailyUsage>(
            "SELECT * FROM user_daily_usages WHERE user_id = $1 AND date = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to find daily usage", e))
    }

    /// List a user's rows between two days inclusive, oldest first.
    pub async fn find_between(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<UserDailyUsage>> {
        sqlx::query_as::<_, UserDailyUsage>(
            "SELECT * FROM user_daily_usages WHERE user_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY date ASC",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to list daily usage", e))
    }
}

/// Find-or-create, lock, and update the row inside `tx`.
async fn apply(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    event: UsageEvent,
    day: NaiveDate,
    at: DateTime<Utc>,
) -> AppResult<UserDailyUsage> {
    sqlx::query(
        "INSERT INTO user_daily_usages (user_id, date) VALUES ($1, $2) \
         ON CONFLICT (user_id, date) DO NOTHING",
    )
    .bind(user_id)
    .bind(day)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::store("Failed to create daily usage row", e))?;

    let row_id: i64 = sqlx::query_scalar(
        "SELECT id FROM user_daily_usages WHERE user_id = $1 AND date = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(day)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| AppError::store("Failed to lock daily usage row", e))?;

    match event {
        UsageEvent::Disconnected => sqlx::query_as::<_, UserDailyUsage>(
            "UPDATE user_daily_usages SET disconnected_at = $2, is_online = FALSE, \
                                          updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(row_id)
        .bind(at)
        .fetch_one(&mut **tx)
        .await,
        UsageEvent::Online => sqlx::query_as::<_, UserDailyUsage>(
            "UPDATE user_daily_usages SET connected_at = $2, is_online = TRUE, \
                                          updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(row_id)
        .bind(at)
        .fetch_one(&mut **tx)
        .await,
        UsageEvent::Message(kind) => {
            // The column name comes from a closed enum, never from input.
            let column = kind.counter_column();
            let sql = format!(
                "UPDATE user_daily_usages SET {column} = {column} + 1, updated_at = NOW() \
                 WHERE id = $1 RETURNING *"
            );
            sqlx::query_as::<_, UserDailyUsage>(&sql)
                .bind(row_id)
                .fetch_one(&mut **tx)
                .await
        }
    }
    .map_err(|e| AppError::store(format!("Failed to apply '{event}' to daily usage"), e))
}
