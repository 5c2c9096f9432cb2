// HTTP routes
pub mod health;
pub mod messages;
pub mod reports;

pub use health::*;
pub use messages::*;
pub use reports::*;
