//! Read-only lookups and aggregate queries.

use std::sync::Arc;

use chrono::Utc;

use sessionhub_core::config::SessionConfig;
use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_database::repositories::{CompanyRepository, UserRepository};
use sessionhub_entity::company::{Company, QuotaStatus};
use sessionhub_entity::user::User;

/// Reporting over users and companies.
#[derive(Debug, Clone)]
pub struct ReportingService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Company repository.
    company_repo: Arc<CompanyRepository>,
    /// Instance scoping for this process.
    session: SessionConfig,
}

impl ReportingService {
    /// Creates a new reporting service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        company_repo: Arc<CompanyRepository>,
        session: SessionConfig,
    ) -> Self {
        Self {
            user_repo,
            company_repo,
            session,
        }
    }

    /// Gets a user by id.
    pub async fn get_user_by_id(&self, id: i64) -> AppResult<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Gets a user by authentication token.
    pub async fn get_user_by_token(&self, token: &str) -> AppResult<User> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("User not found for token"))
    }

    /// Gets a company by authentication token.
    pub async fn get_company_by_token(&self, token: &str) -> AppResult<Company> {
        self.company_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Company not found for token"))
    }

    /// Gets a company by id.
    pub async fn get_company_by_id(&self, id: i64) -> AppResult<Company> {
        self.company_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Company {id} not found")))
    }

    /// Lists connected users of the instance this process serves.
    ///
    /// Fails with a configuration error when no instance is configured.
    pub async fn list_connected_users(&self) -> AppResult<Vec<User>> {
        let instance = self.session.require_instance()?;
        self.user_repo.find_connected_in_instance(instance).await
    }

    /// Lists a company's users in one instance, connected first, then by id.
    pub async fn list_company_users(&self, company_id: i64, instance: &str) -> AppResult<Vec<User>> {
        self.user_repo.find_by_company(company_id, instance).await
    }

    /// Counts connected users in one instance.
    pub async fn count_connected_users(&self, instance: &str) -> AppResult<i64> {
        self.user_repo.count_connected(instance).await
    }

    /// Reports a company's quotas against its current slot counts.
    pub async fn company_quota(&self, company_id: i64, instance: &str) -> AppResult<QuotaStatus> {
        let company = self.get_company_by_id(company_id).await?;
        let company_users = self.user_repo.count_by_company(company_id, None).await?;
        let instance_users = self
            .user_repo
            .count_by_company(company_id, Some(instance))
            .await?;

        Ok(QuotaStatus::new(
            &company,
            instance,
            company_users,
            instance_users,
            Utc::now(),
        ))
    }
}
