//! One-shot heartbeat command.

use sessionhub_core::config::AppConfig;
use sessionhub_core::error::AppError;
use sessionhub_database::DatabasePool;

use super::Services;

/// Run one heartbeat scan and print the report as JSON
pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    let services = Services::build(&db, &config);

    let report = services.usage.mark_all_connected_online().await?;

    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "user_id": f.user_id,
                "kind": f.error.kind,
                "error": f.error.message,
            })
        })
        .collect();

    let output = serde_json::json!({
        "scanned": report.scanned,
        "succeeded": report.succeeded,
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    db.close().await;
    Ok(())
}
