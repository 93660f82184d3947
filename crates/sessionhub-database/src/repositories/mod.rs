//! Repository implementations for all SessionHub entities.

pub mod company;
pub mod usage;
pub mod user;

pub use company::CompanyRepository;
pub use usage::UsageRepository;
pub use user::UserRepository;
