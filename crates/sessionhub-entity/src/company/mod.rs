//! Company (tenant) domain entities.

pub mod model;
pub mod quota;

pub use model::{Company, CreateCompany};
pub use quota::QuotaStatus;
