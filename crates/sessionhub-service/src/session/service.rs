//! Session slot lifecycle: provisioning, QR/pairing handshake, and
//! connect/disconnect transitions.
//!
//! QR and pairing updates are scoped by id *and* instance and report a
//! miss as `NotFound`. The bare connection flips and field setters are
//! scoped by id only and accept a miss silently; `connect` and `disconnect`
//! report a miss as `NotFound` before touching the ledger.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_database::repositories::UserRepository;
use sessionhub_entity::usage::{MessageKind, UsageEvent, UserDailyUsage};
use sessionhub_entity::user::{ConnectionState, CreateUser, User};

use crate::usage::UsageAccountingService;

/// Mutates session slot rows.
#[derive(Debug, Clone)]
pub struct SessionStateService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Usage ledger.
    usage: Arc<UsageAccountingService>,
}

impl SessionStateService {
    /// Creates a new session state service.
    pub fn new(user_repo: Arc<UserRepository>, usage: Arc<UsageAccountingService>) -> Self {
        Self { user_repo, usage }
    }

    /// Provisions a new slot and returns its id.
    ///
    /// When the slot belongs to a company, the company must exist, be within
    /// its contract, and have room under both of its quotas. The check and
    /// the insert are atomic with respect to other provisioning calls.
    pub async fn create_user(&self, data: &CreateUser) -> AppResult<i64> {
        let user = self.user_repo.create(data).await?;
        info!(user_id = user.id, instance = %user.instance, company_id = ?user.company_id, "User created");
        Ok(user.id)
    }

    /// Saves every mutable column of an existing slot.
    pub async fn update_user(&self, user: &User) -> AppResult<User> {
        self.user_repo.save(user).await
    }

    /// Soft-deletes a slot. Deleting a missing slot is not an error.
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        if self.user_repo.soft_delete(id).await? {
            info!(user_id = id, "User deleted");
        } else {
            debug!(user_id = id, "Delete matched no live user");
        }
        Ok(())
    }

    /// Stores a QR payload for the slot `(id, instance)`.
    pub async fn set_qrcode(&self, id: i64, qrcode: &str, instance: &str) -> AppResult<()> {
        let affected = self.user_repo.set_qrcode(id, instance, qrcode).await?;
        if affected == 0 {
            warn!(user_id = id, instance, "No rows affected when setting QR code");
            return Err(AppError::not_found(format!(
                "No user {id} on instance '{instance}' to receive a QR code"
            )));
        }
        Ok(())
    }

    /// Stores a pairing code for the slot `(id, instance)`.
    pub async fn set_pairing_code(
        &self,
        id: i64,
        pairing_code: &str,
        instance: &str,
    ) -> AppResult<()> {
        let affected = self
            .user_repo
            .set_pairing_code(id, instance, pairing_code)
            .await?;
        if affected == 0 {
            warn!(user_id = id, instance, "No rows affected when setting pairing code");
            return Err(AppError::not_found(format!(
                "No user {id} on instance '{instance}' to receive a pairing code"
            )));
        }
        Ok(())
    }

    /// Marks the slot connected.
    pub async fn set_connected(&self, id: i64) -> AppResult<()> {
        self.set_state(id, ConnectionState::Connected).await.map(drop)
    }

    /// Marks the slot disconnected.
    pub async fn set_disconnected(&self, id: i64) -> AppResult<()> {
        self.set_state(id, ConnectionState::Disconnected)
            .await
            .map(drop)
    }

    /// Sets the messaging session identifier.
    pub async fn set_jid(&self, id: i64, jid: &str) -> AppResult<()> {
        self.user_repo.set_jid(id, jid).await.map(drop)
    }

    /// Sets the webhook URL.
    pub async fn set_webhook(&self, id: i64, webhook: &str) -> AppResult<()> {
        self.user_repo.set_webhook(id, webhook).await.map(drop)
    }

    /// Sets the event subscription filter.
    pub async fn set_events(&self, id: i64, events: &str) -> AppResult<()> {
        self.user_repo.set_events(id, events).await.map(drop)
    }

    /// Transport came up: flip the flag and record `online` for today.
    ///
    /// Unlike [`Self::set_connected`], a missing or deleted slot is
    /// `NotFound` and nothing is written to the ledger.
    pub async fn connect(&self, id: i64) -> AppResult<UserDailyUsage> {
        self.transition(id, ConnectionState::Connected, UsageEvent::Online)
            .await
    }

    /// Transport went down: flip the flag and record `disconnected` for today.
    ///
    /// Unlike [`Self::set_disconnected`], a missing or deleted slot is
    /// `NotFound` and nothing is written to the ledger.
    pub async fn disconnect(&self, id: i64) -> AppResult<UserDailyUsage> {
        self.transition(id, ConnectionState::Disconnected, UsageEvent::Disconnected)
            .await
    }

    /// A message was sent: bump today's counter for its kind.
    pub async fn record_message(&self, id: i64, kind: MessageKind) -> AppResult<UserDailyUsage> {
        self.usage.record(id, UsageEvent::Message(kind)).await
    }

    async fn set_state(&self, id: i64, state: ConnectionState) -> AppResult<u64> {
        let affected = self.user_repo.set_connection_state(id, state).await?;
        debug!(user_id = id, %state, affected, "Connection state updated");
        Ok(affected)
    }

    async fn transition(
        &self,
        id: i64,
        state: ConnectionState,
        event: UsageEvent,
    ) -> AppResult<UserDailyUsage> {
        if self.set_state(id, state).await? == 0 {
            warn!(user_id = id, %state, "No live user to transition");
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        self.usage.record(id, event).await
    }
}
