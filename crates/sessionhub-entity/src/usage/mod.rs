//! Daily usage ledger entities.

pub mod event;
pub mod model;

pub use event::{MessageKind, UsageEvent};
pub use model::UserDailyUsage;
