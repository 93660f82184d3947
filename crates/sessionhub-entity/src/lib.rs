//! # sessionhub-entity
//!
//! Domain entity models for SessionHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod company;
pub mod usage;
pub mod user;
