//! User repository implementation.
//!
//! Every query here skips soft-deleted rows. Field updates return the
//! number of affected rows and leave it to the caller to decide whether
//! zero is an error.

use chrono::Utc;
use sqlx::PgPool;

use sessionhub_core::error::{AppError, ErrorKind};
use sessionhub_core::result::AppResult;
use sessionhub_entity::company::{Company, QuotaStatus};
use sessionhub_entity::user::{ConnectionState, CreateUser, User};

/// Repository for session-slot rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to find user by id", e))
    }

    /// Find a user by authentication token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE token = $1 AND deleted_at IS NULL")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to find user by token", e))
    }

    /// List connected users across every tenant and instance.
    pub async fn find_all_connected(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE connected = 1 AND deleted_at IS NULL ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to list connected users", e))
    }

    /// List connected users of one instance.
    pub async fn find_connected_in_instance(&self, instance: &str) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE connected = 1 AND instance = $1 AND deleted_at IS NULL \
             ORDER BY id ASC",
        )
        .bind(instance)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to list connected users", e))
    }

    /// List a company's users in one instance, connected users first.
    pub async fn find_by_company(&self, company_id: i64, instance: &str) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE company_id = $1 AND instance = $2 AND deleted_at IS NULL \
             ORDER BY connected DESC, id ASC",
        )
        .bind(company_id)
        .bind(instance)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to list company users", e))
    }

    /// Count connected users of one instance.
    pub async fn count_connected(&self, instance: &str) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE instance = $1 AND connected = 1 AND deleted_at IS NULL",
        )
        .bind(instance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to count connected users", e))
    }

    /// Count a company's users, optionally restricted to one instance.
    pub async fn count_by_company(&self, company_id: i64, instance: Option<&str>) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE company_id = $1 AND ($2::TEXT IS NULL OR instance = $2) AND deleted_at IS NULL",
        )
        .bind(company_id)
        .bind(instance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to count company users", e))
    }

    /// Create a new user.
    ///
    /// When the user belongs to a company, the company row is locked with
    /// `FOR UPDATE` and its quotas are checked against fresh counts inside
    /// the same transaction as the insert, so concurrent provisioning for
    /// one company is serialized and can never overshoot a limit.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Connectivity,
                "Failed to begin user creation",
                e,
            )
        })?;

        if let Some(company_id) = data.company_id {
            let company = sqlx::query_as::<_, Company>(
                "SELECT * FROM companies WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
            )
            .bind(company_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::store("Failed to lock company", e))?
            .ok_or_else(|| AppError::conflict(format!("Company {company_id} does not exist")))?;

            let (company_users, instance_users): (i64, i64) = sqlx::query_as(
                "SELECT COUNT(*), COUNT(*) FILTER (WHERE instance = $2) FROM users \
                 WHERE company_id = $1 AND deleted_at IS NULL",
            )
            .bind(company_id)
            .bind(&data.instance)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::store("Failed to count company users", e))?;

            QuotaStatus::new(
                &company,
                &data.instance,
                company_users,
                instance_users,
                Utc::now(),
            )
            .ensure_capacity()?;
        }

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, token, webhook, events, expiration, company_id, instance, whatsapp_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.token)
        .bind(&data.webhook)
        .bind(&data.events)
        .bind(data.expiration)
        .bind(data.company_id)
        .bind(&data.instance)
        .bind(data.whatsapp_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_token_key") => {
                AppError::conflict("User token already in use")
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::conflict(format!(
                    "Company {:?} does not exist",
                    data.company_id
                ))
            }
            _ => AppError::store("Failed to create user", e),
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Connectivity,
                "Failed to commit user creation",
                e,
            )
        })?;

        Ok(user)
    }

    /// Save every mutable column of a user.
    pub async fn save(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = $2, token = $3, webhook = $4, jid = $5, qrcode = $6, \
                              connected = $7, expiration = $8, events = $9, pairing_code = $10, \
                              instance = $11, count_text_msg = $12, count_image_msg = $13, \
                              count_voice_msg = $14, count_video_msg = $15, count_sticker_msg = $16, \
                              count_location_msg = $17, count_contact_msg = $18, \
                              count_document_msg = $19, company_id = $20, whatsapp_id = $21, \
                              updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.token)
        .bind(&user.webhook)
        .bind(&user.jid)
        .bind(&user.qrcode)
        .bind(user.connected)
        .bind(user.expiration)
        .bind(&user.events)
        .bind(&user.pairing_code)
        .bind(&user.instance)
        .bind(user.count_text_msg)
        .bind(user.count_image_msg)
        .bind(user.count_voice_msg)
        .bind(user.count_video_msg)
        .bind(user.count_sticker_msg)
        .bind(user.count_location_msg)
        .bind(user.count_contact_msg)
        .bind(user.count_document_msg)
        .bind(user.company_id)
        .bind(user.whatsapp_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to update user", e))?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))
    }

    /// Soft-delete a user. Returns `true` if a live row was marked.
    pub async fn soft_delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the QR payload when both id and instance match.
    pub async fn set_qrcode(&self, id: i64, instance: &str, qrcode: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET qrcode = $3, updated_at = NOW() \
             WHERE id = $1 AND instance = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(instance)
        .bind(qrcode)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to set qrcode", e))?;

        Ok(result.rows_affected())
    }

    /// Set the pairing code when both id and instance match.
    pub async fn set_pairing_code(
        &self,
        id: i64,
        instance: &str,
        pairing_code: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET pairing_code = $3, updated_at = NOW() \
             WHERE id = $1 AND instance = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(instance)
        .bind(pairing_code)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to set pairing code", e))?;

        Ok(result.rows_affected())
    }

    /// Flip the connection flag.
    pub async fn set_connection_state(&self, id: i64, state: ConnectionState) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET connected = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(state)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to set connection state", e))?;

        Ok(result.rows_affected())
    }

    /// Set the messaging session identifier.
    pub async fn set_jid(&self, id: i64, jid: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET jid = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(jid)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to set jid", e))?;

        Ok(result.rows_affected())
    }

    /// Set the webhook URL.
    pub async fn set_webhook(&self, id: i64, webhook: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET webhook = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(webhook)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to set webhook", e))?;

        Ok(result.rows_affected())
    }

    /// Set the event subscription filter.
    pub async fn set_events(&self, id: i64, events: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET events = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(events)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to set events", e))?;

        Ok(result.rows_affected())
    }
}
