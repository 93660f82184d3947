//! Usage event tags and their counter mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use sessionhub_core::AppError;

/// The eight message kinds tracked by the usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Voice,
    Video,
    Sticker,
    Location,
    Contact,
    Document,
}

impl MessageKind {
    /// Every message kind, in column order.
    pub const ALL: [MessageKind; 8] = [
        Self::Text,
        Self::Image,
        Self::Voice,
        Self::Video,
        Self::Sticker,
        Self::Location,
        Self::Contact,
        Self::Document,
    ];

    /// Return the wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::Sticker => "sticker",
            Self::Location => "location",
            Self::Contact => "contact",
            Self::Document => "document",
        }
    }

    /// Return the counter column incremented for this kind.
    pub fn counter_column(&self) -> &'static str {
        match self {
            Self::Text => "count_text_msg",
            Self::Image => "count_image_msg",
            Self::Voice => "count_voice_msg",
            Self::Video => "count_video_msg",
            Self::Sticker => "count_sticker_msg",
            Self::Location => "count_location_msg",
            Self::Contact => "count_contact_msg",
            Self::Document => "count_document_msg",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A session event recorded against the daily usage ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageEvent {
    /// A message of the given kind was sent.
    Message(MessageKind),
    /// The transport came up (or the heartbeat re-asserted it).
    Online,
    /// The transport went down.
    Disconnected,
}

impl UsageEvent {
    /// Return the wire tag for this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message(kind) => kind.as_str(),
            Self::Online => "online",
            Self::Disconnected => "disconnected",
        }
    }
}

impl From<MessageKind> for UsageEvent {
    fn from(kind: MessageKind) -> Self {
        Self::Message(kind)
    }
}

impl fmt::Display for UsageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UsageEvent {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "disconnected" => Ok(Self::Disconnected),
            _ => MessageKind::ALL
                .into_iter()
                .find(|kind| kind.as_str() == s)
                .map(Self::Message)
                .ok_or_else(|| AppError::unsupported_event(format!("Unsupported event type: '{s}'"))),
        }
    }
}
