pub mod proposal;
pub mod vote;

pub use proposal::{Proposal, ProposalSummary};
pub use vote::{InvalidVoteChoice, Tally, Vote, VoteChoice, VOTE_WEIGHT};
