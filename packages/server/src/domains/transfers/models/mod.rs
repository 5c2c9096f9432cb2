pub mod transfer;

pub use transfer::{MemberBalance, TransferRecord};
