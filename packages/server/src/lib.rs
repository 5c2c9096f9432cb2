// Community Engagement Tipbot - Core
//
// This crate records registrations, proposals, and votes, and coordinates
// outbound transfers from a single shared wallet for a chat community.
//
// Domains live in domains/*; shared infrastructure lives in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
