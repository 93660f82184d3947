//! # sessionhub-service
//!
//! Service layer for SessionHub. The session state manager mutates a
//! session slot's connection lifecycle, the usage accounting service
//! maintains the daily ledger, and the reporting service answers
//! read-only queries.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references, and every read goes to the
//! store.

pub mod report;
pub mod session;
pub mod usage;

pub use report::{QuotaStatus, ReportingService};
pub use session::SessionStateService;
pub use usage::{HeartbeatFailure, HeartbeatReport, HeartbeatTask, UsageAccountingService};
