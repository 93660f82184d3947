//! Database migration command.

use sessionhub_core::config::AppConfig;
use sessionhub_core::error::AppError;
use sessionhub_database::DatabasePool;

/// Apply all pending migrations
pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    sessionhub_database::migration::run_migrations(db.pool()).await?;
    db.close().await;
    println!("All migrations applied successfully.");
    Ok(())
}
