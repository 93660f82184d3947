//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::connection::ConnectionState;

/// One messaging session slot.
///
/// The `count_*_msg` columns are lifetime counters kept for older clients;
/// per-day accounting lives in the usage ledger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Globally unique authentication token.
    #[serde(skip_serializing)]
    pub token: String,
    /// Webhook URL for event delivery.
    pub webhook: String,
    /// Messaging session identifier.
    pub jid: String,
    /// Current QR payload.
    pub qrcode: String,
    /// Transport connection flag.
    pub connected: ConnectionState,
    /// Expiration as a Unix epoch.
    pub expiration: i64,
    /// Event subscription filter.
    pub events: String,
    /// Current pairing code.
    pub pairing_code: String,
    /// Instance (logical shard) label.
    pub instance: String,
    pub count_text_msg: i64,
    pub count_image_msg: i64,
    pub count_voice_msg: i64,
    pub count_video_msg: i64,
    pub count_sticker_msg: i64,
    pub count_location_msg: i64,
    pub count_contact_msg: i64,
    pub count_document_msg: i64,
    /// Owning company.
    pub company_id: Option<i64>,
    /// External messaging account reference.
    pub whatsapp_id: Option<i64>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the session transport is up.
    pub fn is_connected(&self) -> bool {
        self.connected.is_connected()
    }
}

/// Data required to provision a new session slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name.
    pub name: String,
    /// Authentication token (must be unique).
    pub token: String,
    /// Webhook URL.
    pub webhook: String,
    /// Event subscription filter.
    pub events: String,
    /// Expiration epoch.
    pub expiration: i64,
    /// Owning company.
    pub company_id: Option<i64>,
    /// Instance label.
    pub instance: String,
    /// External messaging account reference.
    pub whatsapp_id: Option<i64>,
}

impl CreateUser {
    /// Build a request with an empty webhook and the `All` events filter.
    pub fn new(
        name: impl Into<String>,
        token: impl Into<String>,
        company_id: Option<i64>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            webhook: String::new(),
            events: "All".to_string(),
            expiration: 0,
            company_id,
            instance: instance.into(),
            whatsapp_id: None,
        }
    }
}
