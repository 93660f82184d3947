//! Long-running server command.

use tokio::sync::watch;

use sessionhub_core::config::AppConfig;
use sessionhub_core::error::AppError;
use sessionhub_database::DatabasePool;
use sessionhub_service::HeartbeatTask;

use super::Services;

/// Connect, migrate, and run the heartbeat until Ctrl-C
pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SessionHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    db.health_check().await?;
    sessionhub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Services ─────────────────────────────────────────
    let services = Services::build(&db, &config);
    match config.session.require_instance() {
        Ok(instance) => tracing::info!(instance, "Serving instance"),
        Err(_) => tracing::warn!("No instance configured; connected-user listings will fail"),
    }

    // ── Step 3: Heartbeat ────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let heartbeat = HeartbeatTask::new(
        std::sync::Arc::clone(&services.usage),
        config.usage.heartbeat_interval(),
    );
    let heartbeat_handle = tokio::spawn(heartbeat.run(shutdown_rx));

    // ── Step 4: Wait for shutdown ────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {e}")))?;
    tracing::info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    if let Err(e) = heartbeat_handle.await {
        tracing::error!("Heartbeat task panicked: {}", e);
    }

    db.close().await;
    tracing::info!("SessionHub stopped");
    Ok(())
}
