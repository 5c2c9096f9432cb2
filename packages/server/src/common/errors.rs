use thiserror::Error;

use super::ProposalId;

/// Failures from the identity store and the proposal/vote ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Proposal description cannot be empty")]
    EmptyDescription,

    #[error("Proposal #{0} not found")]
    UnknownProposal(ProposalId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
