//! Governance actions - proposal creation, voting, tallies

mod cast_vote;
mod create_proposal;

pub use cast_vote::{cast_vote, tally};
pub use create_proposal::{create_proposal, list_with_tally};
