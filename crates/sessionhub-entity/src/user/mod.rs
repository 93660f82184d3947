//! User (session slot) domain entities.

pub mod connection;
pub mod model;

pub use connection::ConnectionState;
pub use model::{CreateUser, User};
