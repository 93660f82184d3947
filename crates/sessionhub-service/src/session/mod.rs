//! Session slot lifecycle management.

pub mod service;

pub use service::SessionStateService;
