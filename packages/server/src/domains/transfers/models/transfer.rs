use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::common::MemberId;
use crate::kernel::{SettlementFailure, TransactionId, TransferRequest};

/// Settlement receipt. Append-only; written after every attempt, success or not.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub id: i64,
    pub kind: String,
    pub actor_id: MemberId,
    pub recipient_id: MemberId,
    pub recipient_address: String,
    pub amount: i64,
    pub status: String,
    pub tx_id: Option<String>,
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-member totals derived from succeeded receipts
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub received: i64,
    pub sent: i64,
    pub wallet_address: Option<String>,
}

impl TransferRecord {
    pub const SUCCEEDED: &'static str = "succeeded";
    pub const FAILED: &'static str = "failed";

    pub fn succeeded(&self) -> bool {
        self.status == Self::SUCCEEDED
    }

    /// Append the outcome of one settlement attempt
    pub async fn record(
        request: &TransferRequest,
        outcome: &Result<TransactionId, SettlementFailure>,
        pool: &SqlitePool,
    ) -> sqlx::Result<Self> {
        let (status, tx_id, failure) = match outcome {
            Ok(tx_id) => (Self::SUCCEEDED, Some(tx_id.0.clone()), None),
            Err(failure) => (Self::FAILED, None, Some(failure.to_string())),
        };
        let amount = i64::try_from(request.amount)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query_as::<_, Self>(
            "INSERT INTO transfers
                (kind, actor_id, recipient_id, recipient_address, amount, status, tx_id, failure, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING *",
        )
        .bind(request.kind.as_str())
        .bind(&request.actor_id)
        .bind(&request.recipient_id)
        .bind(&request.recipient_address)
        .bind(amount)
        .bind(status)
        .bind(tx_id)
        .bind(failure)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Receipts where the member sent or received, newest first
    pub async fn find_for_member(
        member_id: &MemberId,
        limit: i64,
        pool: &SqlitePool,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM transfers
             WHERE actor_id = ?1 OR recipient_id = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )
        .bind(member_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Totals for one member.
    ///
    /// `received` counts every succeeded transfer paid to the member (tips,
    /// rewards, auto-rewards). `sent` counts only tips, since rewards are paid
    /// from the shared wallet rather than by the admin who issued them.
    pub async fn balance_for(member_id: &MemberId, pool: &SqlitePool) -> sqlx::Result<MemberBalance> {
        let (received, sent) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT
                COALESCE(SUM(CASE WHEN recipient_id = ?1 THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN actor_id = ?1 AND kind = 'tip' THEN amount ELSE 0 END), 0)
             FROM transfers
             WHERE status = 'succeeded'",
        )
        .bind(member_id)
        .fetch_one(pool)
        .await?;

        let wallet_address = sqlx::query_scalar::<_, String>("SELECT address FROM members WHERE id = ?1")
            .bind(member_id)
            .fetch_optional(pool)
            .await?;

        Ok(MemberBalance {
            member_id: member_id.clone(),
            received,
            sent,
            wallet_address,
        })
    }
}
