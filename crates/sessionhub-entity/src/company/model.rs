//! Company entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tenant owning a set of session slots.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    /// Unique company identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Globally unique authentication token.
    #[serde(skip_serializing)]
    pub token: String,
    /// Maximum number of session slots the company may own.
    pub connections_limit: i32,
    /// Maximum number of session slots the company may own per instance.
    pub connections_instance: i32,
    /// Contract expiration, if any.
    pub date_limit: Option<DateTime<Utc>>,
    /// Opaque per-tenant cache endpoint.
    pub redis_uri: String,
    /// When the company was created.
    pub created_at: DateTime<Utc>,
    /// When the company was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Company {
    /// Check whether the company's contract has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.date_limit.is_some_and(|limit| limit <= now)
    }
}

/// Data required to create a new company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Display name.
    pub name: String,
    /// Authentication token (must be unique).
    pub token: String,
    /// Maximum session slots overall.
    pub connections_limit: i32,
    /// Maximum session slots per instance.
    pub connections_instance: i32,
    /// Contract expiration.
    pub date_limit: Option<DateTime<Utc>>,
    /// Per-tenant cache endpoint.
    pub redis_uri: String,
}

impl CreateCompany {
    /// Build a company request with the default quotas (10 overall, 200 per instance).
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            connections_limit: 10,
            connections_instance: 200,
            date_limit: None,
            redis_uri: String::new(),
        }
    }
}
