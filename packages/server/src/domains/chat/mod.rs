//! Chat domain - command parsing and the action dispatcher

pub mod command;
pub mod dispatcher;
pub mod errors;

pub use command::{parse_amount, Command, HELP_TEXT, MAX_AMOUNT};
pub use dispatcher::{ActionDispatcher, InboundMessage};
pub use errors::ActionError;
