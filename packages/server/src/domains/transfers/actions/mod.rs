mod send_transfer;

pub use send_transfer::{disburse, member_balance, member_transactions};
