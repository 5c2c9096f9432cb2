//! Read-only reporting endpoints over the ledger and the transfer journal.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{LedgerError, MemberId, ProposalId};
use crate::domains::governance::{list_with_tally, Tally};
use crate::domains::transfers::{member_balance, member_transactions, MemberBalance, TransferRecord};
use crate::kernel::SettlementFailure;
use crate::server::app::AppState;

const DEFAULT_TRANSACTION_LIMIT: i64 = 50;
const MAX_TRANSACTION_LIMIT: i64 = 200;

#[derive(Debug)]
pub enum ReportError {
    Ledger(LedgerError),
    Settlement(SettlementFailure),
}

impl From<LedgerError> for ReportError {
    fn from(e: LedgerError) -> Self {
        ReportError::Ledger(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ReportError::Ledger(e) => {
                tracing::error!(error = %e, "Report query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "database error".to_string())
            }
            ReportError::Settlement(SettlementFailure::Timeout) => {
                (StatusCode::GATEWAY_TIMEOUT, SettlementFailure::Timeout.to_string())
            }
            ReportError::Settlement(failure) => (StatusCode::BAD_GATEWAY, failure.to_string()),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

pub async fn member_balance_handler(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<MemberBalance>, ReportError> {
    let member_id = MemberId::new(member_id);
    Ok(Json(member_balance(&member_id, &state.db_pool).await?))
}

#[derive(Deserialize, Debug, Default)]
pub struct TransactionsQuery {
    pub limit: Option<i64>,
}

pub async fn member_transactions_handler(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<TransferRecord>>, ReportError> {
    let member_id = MemberId::new(member_id);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TRANSACTION_LIMIT)
        .clamp(1, MAX_TRANSACTION_LIMIT);

    Ok(Json(
        member_transactions(&member_id, limit, &state.db_pool).await?,
    ))
}

#[derive(Serialize, Debug)]
pub struct ProposalReport {
    pub id: ProposalId,
    pub description: String,
    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
    pub tally: Tally,
}

pub async fn proposals_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<ProposalReport>>, ReportError> {
    let proposals = list_with_tally(&state.db_pool)
        .await?
        .into_iter()
        .map(|p| ProposalReport {
            tally: p.tally(),
            id: p.id,
            description: p.description,
            created_by: p.created_by,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(proposals))
}

#[derive(Serialize, Debug)]
pub struct WalletBalanceResponse {
    pub available: u64,
    pub token_symbol: String,
}

/// Shared wallet balance, read through the disbursement coordinator
pub async fn wallet_balance_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<WalletBalanceResponse>, ReportError> {
    let available = state
        .server_deps
        .disbursement
        .balance()
        .await
        .map_err(ReportError::Settlement)?;

    Ok(Json(WalletBalanceResponse {
        available,
        token_symbol: state.server_deps.settings.token_symbol.clone(),
    }))
}
