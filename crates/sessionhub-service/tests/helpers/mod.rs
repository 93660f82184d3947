//! Shared helpers for database-backed integration tests.
//!
//! Tests run against the PostgreSQL database named by
//! `SESSIONHUB_TEST_DATABASE_URL` and are skipped when it is unset. Every
//! test provisions its own company, tokens, and instance name, so tests can
//! share one database and run in parallel.

#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use sessionhub_core::config::{DatabaseConfig, SessionConfig, UsageConfig};
use sessionhub_database::DatabasePool;
use sessionhub_database::repositories::{CompanyRepository, UsageRepository, UserRepository};
use sessionhub_entity::company::{Company, CreateCompany};
use sessionhub_entity::user::{CreateUser, User};
use sessionhub_service::{ReportingService, SessionStateService, UsageAccountingService};

/// Environment variable naming the test database.
pub const TEST_DATABASE_URL_VAR: &str = "SESSIONHUB_TEST_DATABASE_URL";

/// Test context wired over a real database.
pub struct TestContext {
    /// Database pool for direct queries.
    pub db: DatabasePool,
    /// Instance name unique to this test.
    pub instance: String,
    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// Company repository.
    pub company_repo: Arc<CompanyRepository>,
    /// Usage accounting service.
    pub usage: Arc<UsageAccountingService>,
    /// Reporting service scoped to `instance`.
    pub reporting: Arc<ReportingService>,
    /// Session state service.
    pub session: Arc<SessionStateService>,
}

impl TestContext {
    /// Connect and migrate, or return `None` when no test database is set.
    pub async fn new() -> Option<Self> {
        let instance = unique("instance");
        Self::with_session(SessionConfig {
            instance: Some(instance),
        })
        .await
    }

    /// Like [`TestContext::new`], but with explicit session scoping.
    pub async fn with_session(session: SessionConfig) -> Option<Self> {
        let Ok(url) = std::env::var(TEST_DATABASE_URL_VAR) else {
            eprintln!("{TEST_DATABASE_URL_VAR} is not set; skipping");
            return None;
        };

        let config = DatabaseConfig {
            url: Some(url),
            max_connections: 20,
            min_connections: 0,
            ..DatabaseConfig::default()
        };

        let db = DatabasePool::connect(&config)
            .await
            .expect("Failed to connect to test database");
        db.health_check()
            .await
            .expect("Test database failed its health check");
        sessionhub_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let instance = session
            .instance
            .clone()
            .unwrap_or_else(|| unique("instance"));

        let user_repo = Arc::new(UserRepository::new(db.pool().clone()));
        let company_repo = Arc::new(CompanyRepository::new(db.pool().clone()));
        let usage_repo = Arc::new(UsageRepository::new(db.pool().clone()));

        let usage = Arc::new(UsageAccountingService::new(
            usage_repo,
            Arc::clone(&user_repo),
            UsageConfig::default(),
        ));
        let reporting = Arc::new(ReportingService::new(
            Arc::clone(&user_repo),
            Arc::clone(&company_repo),
            session,
        ));
        let session = Arc::new(SessionStateService::new(
            Arc::clone(&user_repo),
            Arc::clone(&usage),
        ));

        Some(Self {
            db,
            instance,
            user_repo,
            company_repo,
            usage,
            reporting,
            session,
        })
    }

    /// Create a company with the given quotas.
    pub async fn create_company(&self, connections_limit: i32, connections_instance: i32) -> Company {
        let mut data = CreateCompany::new("Test Company", unique("company"));
        data.connections_limit = connections_limit;
        data.connections_instance = connections_instance;
        self.company_repo
            .create(&data)
            .await
            .expect("Failed to create company")
    }

    /// Create a user in this test's instance.
    pub async fn create_user(&self, name: &str, company_id: Option<i64>) -> User {
        self.create_user_in(name, company_id, &self.instance).await
    }

    /// Create a user in an arbitrary instance.
    pub async fn create_user_in(&self, name: &str, company_id: Option<i64>, instance: &str) -> User {
        let data = CreateUser::new(name, unique("user"), company_id, instance);
        let id = self
            .session
            .create_user(&data)
            .await
            .expect("Failed to create user");
        self.reload_user(id).await
    }

    /// Reload a user straight from the store.
    pub async fn reload_user(&self, id: i64) -> User {
        self.user_repo
            .find_by_id(id)
            .await
            .expect("Failed to load user")
            .expect("User should exist")
    }

    /// Count ledger rows for a user, regardless of date.
    pub async fn usage_row_count(&self, user_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_daily_usages WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count usage rows")
    }
}

/// A token unique to one test run.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
