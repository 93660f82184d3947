//! Company quota snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sessionhub_core::error::AppError;

use super::model::Company;

/// A company's session-slot quotas next to its current usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    /// The company.
    pub company_id: i64,
    /// The instance the per-instance figures refer to.
    pub instance: String,
    /// Maximum slots overall.
    pub connections_limit: i64,
    /// Maximum slots in `instance`.
    pub connections_instance: i64,
    /// Live slots owned by the company.
    pub company_users: i64,
    /// Live slots owned by the company in `instance`.
    pub instance_users: i64,
    /// Whether the company's contract has expired.
    pub expired: bool,
}

impl QuotaStatus {
    /// Build a snapshot from a company row and the current counts.
    pub fn new(
        company: &Company,
        instance: &str,
        company_users: i64,
        instance_users: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            company_id: company.id,
            instance: instance.to_string(),
            connections_limit: i64::from(company.connections_limit),
            connections_instance: i64::from(company.connections_instance),
            company_users,
            instance_users,
            expired: company.is_expired_at(now),
        }
    }

    /// Whether one more slot may be provisioned.
    pub fn has_capacity(&self) -> bool {
        !self.expired
            && self.company_users < self.connections_limit
            && self.instance_users < self.connections_instance
    }

    /// Fail unless one more slot may be provisioned.
    pub fn ensure_capacity(&self) -> Result<(), AppError> {
        if self.expired {
            return Err(AppError::validation(format!(
                "Company {} contract has expired",
                self.company_id
            )));
        }
        if self.company_users >= self.connections_limit {
            return Err(AppError::conflict(format!(
                "Company {} reached its limit of {} sessions",
                self.company_id, self.connections_limit
            )));
        }
        if self.instance_users >= self.connections_instance {
            return Err(AppError::conflict(format!(
                "Company {} reached its limit of {} sessions on instance '{}'",
                self.company_id, self.connections_instance, self.instance
            )));
        }
        Ok(())
    }
}
