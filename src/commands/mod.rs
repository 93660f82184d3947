//! CLI command definitions and dispatch.

pub mod heartbeat;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use sessionhub_core::config::AppConfig;
use sessionhub_core::error::AppError;
use sessionhub_database::DatabasePool;
use sessionhub_database::repositories::{CompanyRepository, UsageRepository, UserRepository};
use sessionhub_service::{ReportingService, SessionStateService, UsageAccountingService};

/// SessionHub: session-state persistence and daily usage accounting
#[derive(Debug, Parser)]
#[command(name = "sessionhub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment; selects `config/{env}.toml`
    #[arg(short, long, env = "SESSIONHUB_ENV", default_value = "development")]
    pub env: String,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Migrate, then run the periodic heartbeat until interrupted
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Run a single heartbeat scan and print its report
    Heartbeat,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match self.command.as_ref().unwrap_or(&Commands::Serve) {
            Commands::Serve => serve::execute(config).await,
            Commands::Migrate => migrate::execute(config).await,
            Commands::Heartbeat => heartbeat::execute(config).await,
        }
    }
}

/// Repositories and services wired over one pool.
#[derive(Debug, Clone)]
pub struct Services {
    /// Session slot lifecycle.
    pub session: Arc<SessionStateService>,
    /// Daily usage ledger.
    pub usage: Arc<UsageAccountingService>,
    /// Read-only queries.
    pub reporting: Arc<ReportingService>,
}

impl Services {
    /// Build every service over the given pool.
    pub fn build(db: &DatabasePool, config: &AppConfig) -> Self {
        let user_repo = Arc::new(UserRepository::new(db.pool().clone()));
        let company_repo = Arc::new(CompanyRepository::new(db.pool().clone()));
        let usage_repo = Arc::new(UsageRepository::new(db.pool().clone()));

        let usage = Arc::new(UsageAccountingService::new(
            usage_repo,
            Arc::clone(&user_repo),
            config.usage.clone(),
        ));
        let reporting = Arc::new(ReportingService::new(
            Arc::clone(&user_repo),
            company_repo,
            config.session.clone(),
        ));
        let session = Arc::new(SessionStateService::new(user_repo, Arc::clone(&usage)));

        Self {
            session,
            usage,
            reporting,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["sessionhub-server", "--env", "production"]).unwrap();
        assert_eq!(cli.env, "production");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["sessionhub-server", "-e", "staging", "heartbeat"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Heartbeat)));
    }
}
