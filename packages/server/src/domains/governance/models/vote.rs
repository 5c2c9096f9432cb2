use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;

use crate::common::{MemberId, ProposalId};

/// Every vote carries exactly one token of weight
pub const VOTE_WEIGHT: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::Yes => "yes",
            VoteChoice::No => "no",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVoteChoice;

impl fmt::Display for InvalidVoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("vote must be \"yes\" or \"no\"")
    }
}

impl std::error::Error for InvalidVoteChoice {}

impl FromStr for VoteChoice {
    type Err = InvalidVoteChoice;

    /// Case-insensitive "yes" / "no"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(VoteChoice::Yes),
            "no" => Ok(VoteChoice::No),
            _ => Err(InvalidVoteChoice),
        }
    }
}

/// Aggregate vote counts for one proposal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub yes: i64,
    pub no: i64,
}

impl Tally {
    /// Equals the number of distinct members who voted
    pub fn total(&self) -> i64 {
        self.yes + self.no
    }
}

/// Vote model - one mutable record per (proposal, member)
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub member_id: MemberId,
    pub choice: String,
    pub weight: i64,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Insert or overwrite the member's vote on a proposal.
    ///
    /// The proposal existence check and the upsert run as one statement.
    /// Returns `false` when the proposal does not exist.
    pub async fn upsert(
        proposal_id: ProposalId,
        member_id: &MemberId,
        choice: VoteChoice,
        pool: &SqlitePool,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO votes (proposal_id, member_id, choice, weight, created_at)
             SELECT ?1, ?2, ?3, ?4, ?5
             WHERE EXISTS (SELECT 1 FROM proposals WHERE id = ?1)
             ON CONFLICT (proposal_id, member_id) DO UPDATE SET
                choice = excluded.choice,
                weight = excluded.weight,
                created_at = excluded.created_at",
        )
        .bind(proposal_id)
        .bind(member_id)
        .bind(choice.as_str())
        .bind(VOTE_WEIGHT)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Current votes on a proposal
    pub async fn find_for_proposal(
        proposal_id: ProposalId,
        pool: &SqlitePool,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM votes WHERE proposal_id = ?1 ORDER BY created_at, member_id",
        )
        .bind(proposal_id)
        .fetch_all(pool)
        .await
    }

    /// Count current votes grouped by choice; missing choices count as 0
    pub async fn tally(proposal_id: ProposalId, pool: &SqlitePool) -> sqlx::Result<Tally> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT choice, COUNT(*) FROM votes WHERE proposal_id = ?1 GROUP BY choice",
        )
        .bind(proposal_id)
        .fetch_all(pool)
        .await?;

        let mut tally = Tally::default();
        for (choice, count) in rows {
            match choice.parse::<VoteChoice>() {
                Ok(VoteChoice::Yes) => tally.yes = count,
                Ok(VoteChoice::No) => tally.no = count,
                Err(_) => tracing::warn!(choice = %choice, "Ignoring unknown vote choice"),
            }
        }
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parsing_is_case_insensitive() {
        assert_eq!("YES".parse::<VoteChoice>(), Ok(VoteChoice::Yes));
        assert_eq!("No".parse::<VoteChoice>(), Ok(VoteChoice::No));
        assert_eq!("maybe".parse::<VoteChoice>(), Err(InvalidVoteChoice));
        assert_eq!("".parse::<VoteChoice>(), Err(InvalidVoteChoice));
    }

    #[test]
    fn tally_total_counts_voters() {
        let tally = Tally { yes: 2, no: 3 };
        assert_eq!(tally.total(), 5);
        assert_eq!(Tally::default().total(), 0);
    }
}
