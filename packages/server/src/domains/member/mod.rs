//! Member domain - identity store mapping chat handles to payout addresses

pub mod actions;
pub mod models;

// Re-export commonly used types
pub use actions::{lookup_address, register_member, validate_address};
pub use models::member::Member;
