//! Transport connection flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection flag stored in `users.connected` (0 = disconnected, 1 = connected).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[repr(i32)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No live transport.
    Disconnected = 0,
    /// Transport is up.
    Connected = 1,
}

impl ConnectionState {
    /// Whether the state is [`ConnectionState::Connected`].
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
        }
    }
}
