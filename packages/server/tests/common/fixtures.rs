//! Test fixtures for creating test data.
//!
//! These fixtures call the domain actions directly, bypassing the dispatcher
//! and its rate limit.

use anyhow::Result;
use sqlx::SqlitePool;
use tipbot_core::common::{MemberId, ProposalId};
use tipbot_core::domains::governance::create_proposal;
use tipbot_core::domains::member::register_member;

/// Register a member with the default W/H prefixes
pub async fn register(pool: &SqlitePool, handle: &str, address: &str) -> Result<MemberId> {
    let member_id = MemberId::new(handle);
    let prefixes = vec!["W".to_string(), "H".to_string()];
    register_member(&member_id, address, &prefixes, pool).await?;
    Ok(member_id)
}

pub async fn proposal(pool: &SqlitePool, description: &str) -> Result<ProposalId> {
    let proposal = create_proposal(description, &MemberId::new("admin"), pool).await?;
    Ok(proposal.id)
}
