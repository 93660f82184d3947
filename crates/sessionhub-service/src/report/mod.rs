//! Read-only lookups, listings, and quota reporting.

pub mod service;

pub use service::ReportingService;
pub use sessionhub_entity::company::QuotaStatus;
