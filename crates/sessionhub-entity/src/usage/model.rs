//! Daily usage ledger row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::event::MessageKind;

/// One row per (user, calendar day).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDailyUsage {
    /// Row identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Local calendar day the row aggregates.
    pub date: NaiveDate,
    pub count_text_msg: i64,
    pub count_image_msg: i64,
    pub count_voice_msg: i64,
    pub count_video_msg: i64,
    pub count_sticker_msg: i64,
    pub count_location_msg: i64,
    pub count_contact_msg: i64,
    pub count_document_msg: i64,
    /// Reflects the most recent online/disconnected transition.
    pub is_online: bool,
    /// Last time the user came online during the day.
    pub connected_at: Option<DateTime<Utc>>,
    /// Last time the user disconnected during the day.
    pub disconnected_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UserDailyUsage {
    /// Return the counter for a message kind.
    pub fn count(&self, kind: MessageKind) -> i64 {
        match kind {
            MessageKind::Text => self.count_text_msg,
            MessageKind::Image => self.count_image_msg,
            MessageKind::Voice => self.count_voice_msg,
            MessageKind::Video => self.count_video_msg,
            MessageKind::Sticker => self.count_sticker_msg,
            MessageKind::Location => self.count_location_msg,
            MessageKind::Contact => self.count_contact_msg,
            MessageKind::Document => self.count_document_msg,
        }
    }

    /// Sum of all message counters.
    pub fn total_messages(&self) -> i64 {
        MessageKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }
}
