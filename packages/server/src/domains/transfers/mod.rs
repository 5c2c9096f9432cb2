//! Transfers domain - settlement through the coordinator plus the receipt journal

pub mod actions;
pub mod models;

pub use actions::{disburse, member_balance, member_transactions};
pub use models::{MemberBalance, TransferRecord};
