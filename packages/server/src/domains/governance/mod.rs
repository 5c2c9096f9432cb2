//! Governance domain - proposals and one-member-one-vote ledger

pub mod actions;
pub mod models;

pub use actions::{cast_vote, create_proposal, list_with_tally, tally};
pub use models::{Proposal, ProposalSummary, Tally, Vote, VoteChoice};
