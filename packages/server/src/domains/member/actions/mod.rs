//! Member domain actions - identity store operations
//!
//! Actions are async functions called by the dispatcher and the HTTP routes.

mod register_member;

pub use register_member::{lookup_address, register_member, validate_address};
