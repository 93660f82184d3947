//! # sessionhub-core
//!
//! Core crate for SessionHub. Contains the configuration schemas and the
//! unified error system shared by the entity, database, and service crates.
//!
//! This crate has **no** internal dependencies on other SessionHub crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
