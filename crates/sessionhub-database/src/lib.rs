//! # sessionhub-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for companies, users, and the daily usage ledger.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
