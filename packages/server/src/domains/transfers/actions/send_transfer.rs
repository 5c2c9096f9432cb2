use sqlx::SqlitePool;
use tracing::error;

use crate::common::{LedgerError, MemberId};
use crate::domains::transfers::models::{MemberBalance, TransferRecord};
use crate::kernel::{ServerDeps, SettlementFailure, TransactionId, TransferRequest};

/// Settle a transfer, then journal the outcome.
///
/// The journal is reporting only: a failed receipt write is logged and the
/// settlement result is returned unchanged.
pub async fn disburse(
    request: &TransferRequest,
    deps: &ServerDeps,
) -> Result<TransactionId, SettlementFailure> {
    let outcome = deps.disbursement.transfer(request).await;

    if let Err(e) = TransferRecord::record(request, &outcome, &deps.db_pool).await {
        error!(
            kind = %request.kind,
            recipient = %request.recipient_id,
            error = %e,
            "Failed to record transfer receipt"
        );
    }

    outcome
}

pub async fn member_balance(
    member_id: &MemberId,
    pool: &SqlitePool,
) -> Result<MemberBalance, LedgerError> {
    Ok(TransferRecord::balance_for(member_id, pool).await?)
}

pub async fn member_transactions(
    member_id: &MemberId,
    limit: i64,
    pool: &SqlitePool,
) -> Result<Vec<TransferRecord>, LedgerError> {
    Ok(TransferRecord::find_for_member(member_id, limit, pool).await?)
}
