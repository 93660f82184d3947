//! Company repository implementation.

use sqlx::PgPool;

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_entity::company::{Company, CreateCompany};

/// Repository for tenant lookups and provisioning.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    /// Create a new company repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a company by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to find company by id", e))
    }

    /// Find a company by its authentication token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE token = $1 AND deleted_at IS NULL",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to find company by token", e))
    }

    /// Create a new company.
    pub async fn create(&self, data: &CreateCompany) -> AppResult<Company> {
        if data.connections_limit < 0 || data.connections_instance < 0 {
            return Err(AppError::validation("Company quotas must be non-negative"));
        }

        sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name, token, connections_limit, connections_instance, date_limit, redis_uri) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.token)
        .bind(data.connections_limit)
        .bind(data.connections_instance)
        .bind(data.date_limit)
        .bind(&data.redis_uri)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("companies_token_key") =>
            {
                AppError::conflict("Company token already in use")
            }
            _ => AppError::store("Failed to create company", e),
        })
    }
}
