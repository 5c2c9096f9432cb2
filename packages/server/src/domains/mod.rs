// Business domains
pub mod chat;
pub mod governance;
pub mod member;
pub mod transfers;
