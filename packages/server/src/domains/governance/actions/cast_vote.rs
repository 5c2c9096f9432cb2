use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::common::{LedgerError, MemberId, ProposalId};
use crate::domains::governance::models::{Proposal, Tally, Vote, VoteChoice};

/// Record (or replace) a member's vote.
///
/// Re-voting overwrites the earlier choice, so a member is counted once per
/// proposal. The caller resolves whether the member is registered.
pub async fn cast_vote(
    proposal_id: ProposalId,
    member_id: &MemberId,
    choice: VoteChoice,
    pool: &SqlitePool,
) -> Result<(), LedgerError> {
    debug!(proposal_id = %proposal_id, member = %member_id, choice = %choice, "Casting vote");

    if !Vote::upsert(proposal_id, member_id, choice, pool).await? {
        return Err(LedgerError::UnknownProposal(proposal_id));
    }

    info!(proposal_id = %proposal_id, member = %member_id, choice = %choice, "Vote recorded");
    Ok(())
}

/// Current tally for one proposal
pub async fn tally(proposal_id: ProposalId, pool: &SqlitePool) -> Result<Tally, LedgerError> {
    let tally = Vote::tally(proposal_id, pool).await?;

    // An empty tally is either "no votes yet" or "no such proposal"
    if tally.total() == 0 && Proposal::find_by_id(proposal_id, pool).await?.is_none() {
        return Err(LedgerError::UnknownProposal(proposal_id));
    }
    Ok(tally)
}
