use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::common::MemberId;

/// Member model - SQL persistence layer
///
/// One row per chat handle. Re-registration overwrites the address in place;
/// rows are never deleted.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Insert or replace the member's address (last write wins)
    pub async fn upsert(id: &MemberId, address: &str, pool: &SqlitePool) -> sqlx::Result<Self> {
        let now = Utc::now();
        sqlx::query_as::<_, Self>(
            "INSERT INTO members (id, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT (id) DO UPDATE SET
                address = excluded.address,
                updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(id)
        .bind(address)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Payout address for a handle, if registered
    pub async fn find_address(id: &MemberId, pool: &SqlitePool) -> sqlx::Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT address FROM members WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All registered members, oldest first
    pub async fn find_all(pool: &SqlitePool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM members ORDER BY created_at, id")
            .fetch_all(pool)
            .await
    }
}
