//! Daily usage accounting and the connected-user heartbeat.

pub mod heartbeat;
pub mod service;

pub use heartbeat::{HeartbeatFailure, HeartbeatReport, HeartbeatTask};
pub use service::UsageAccountingService;
