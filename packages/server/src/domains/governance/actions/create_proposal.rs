use sqlx::SqlitePool;
use tracing::info;

use crate::common::{LedgerError, MemberId};
use crate::domains::governance::models::{Proposal, ProposalSummary};

/// Create a proposal. Authorization is the caller's job; this only rejects
/// descriptions that are blank after trimming.
pub async fn create_proposal(
    description: &str,
    created_by: &MemberId,
    pool: &SqlitePool,
) -> Result<Proposal, LedgerError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(LedgerError::EmptyDescription);
    }

    let proposal = Proposal::create(description, created_by, pool).await?;
    info!(proposal_id = %proposal.id, created_by = %created_by, "Proposal created");
    Ok(proposal)
}

/// Every proposal with its current tally, oldest first
pub async fn list_with_tally(pool: &SqlitePool) -> Result<Vec<ProposalSummary>, LedgerError> {
    Ok(Proposal::find_all_with_tally(pool).await?)
}
