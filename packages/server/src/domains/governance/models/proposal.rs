use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::common::{MemberId, ProposalId};
use crate::domains::governance::models::vote::Tally;

/// Proposal model - immutable once created
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub id: ProposalId,
    pub description: String,
    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
}

/// Proposal joined with its current tally (reporting)
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProposalSummary {
    pub id: ProposalId,
    pub description: String,
    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
    pub yes_votes: i64,
    pub no_votes: i64,
}

impl ProposalSummary {
    pub fn tally(&self) -> Tally {
        Tally {
            yes: self.yes_votes,
            no: self.no_votes,
        }
    }
}

impl Proposal {
    /// Insert a proposal; the id comes from AUTOINCREMENT and is never reused
    pub async fn create(
        description: &str,
        created_by: &MemberId,
        pool: &SqlitePool,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO proposals (description, created_by, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING *",
        )
        .bind(description)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Find proposal by ID
    pub async fn find_by_id(id: ProposalId, pool: &SqlitePool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM proposals WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All proposals with their current tallies, oldest first
    pub async fn find_all_with_tally(pool: &SqlitePool) -> sqlx::Result<Vec<ProposalSummary>> {
        sqlx::query_as::<_, ProposalSummary>(
            "SELECT p.id, p.description, p.created_by, p.created_at,
                    COALESCE(SUM(CASE WHEN v.choice = 'yes' THEN 1 ELSE 0 END), 0) AS yes_votes,
                    COALESCE(SUM(CASE WHEN v.choice = 'no' THEN 1 ELSE 0 END), 0) AS no_votes
             FROM proposals p
             LEFT JOIN votes v ON v.proposal_id = p.id
             GROUP BY p.id
             ORDER BY p.id",
        )
        .fetch_all(pool)
        .await
    }
}
