//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the
//! dispatcher, the domain actions, and the HTTP routes. All external services
//! sit behind trait abstractions so tests can swap in mocks.

use anyhow::Result;
use async_trait::async_trait;
use hathor::{HathorError, HathorOptions, HathorService};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::{HasAuthContext, MemberId};
use crate::kernel::{
    disbursement::{DisbursementCoordinator, SettlementFailure},
    rate_limiter::RateLimiter,
    BaseSentimentClassifier, BaseSettlementClient, BaseSettlementHandle,
};

// =============================================================================
// Hathor Adapter (implements the settlement traits)
// =============================================================================

/// Starts a fresh wallet-headless session on every `init`
pub struct HathorAdapter {
    options: HathorOptions,
}

impl HathorAdapter {
    pub fn new(options: HathorOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl BaseSettlementClient for HathorAdapter {
    async fn init(&self) -> Result<Arc<dyn BaseSettlementHandle>> {
        let service = HathorService::new(self.options.clone()).map_err(settlement_error)?;
        service.start().await.map_err(settlement_error)?;
        tracing::info!(wallet_id = %service.wallet_id(), "Hathor wallet started");
        Ok(Arc::new(HathorHandle(service)))
    }
}

/// Wrapper around a started HathorService
pub struct HathorHandle(HathorService);

#[async_trait]
impl BaseSettlementHandle for HathorHandle {
    async fn submit(&self, address: &str, amount: u64) -> Result<String> {
        self.0
            .send_tx(address, amount)
            .await
            .map_err(settlement_error)
    }

    async fn balance(&self) -> Result<u64> {
        self.0
            .balance()
            .await
            .map(|b| b.available)
            .map_err(settlement_error)
    }
}

/// Categorize client errors so the coordinator can report them precisely
fn settlement_error(e: HathorError) -> anyhow::Error {
    let failure = match &e {
        HathorError::Request(req) if req.is_timeout() => SettlementFailure::Timeout,
        HathorError::Request(_) | HathorError::NotReady(_) | HathorError::StartFailed(_) => {
            SettlementFailure::Unavailable(e.to_string())
        }
        HathorError::Status { status, .. } if *status >= 500 => {
            SettlementFailure::Unavailable(e.to_string())
        }
        HathorError::Rejected(reason) => SettlementFailure::Rejected(reason.clone()),
        HathorError::Status { .. } => SettlementFailure::Rejected(e.to_string()),
    };
    anyhow::Error::new(failure)
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Tunables for the engagement rules
#[derive(Debug, Clone)]
pub struct EngagementSettings {
    /// Accepted payout address prefixes (network convention)
    pub address_prefixes: Vec<String>,
    /// Display symbol used in replies
    pub token_symbol: String,
    /// Fixed amount for sentiment-triggered rewards
    pub auto_reward_amount: u64,
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self {
            address_prefixes: vec!["W".to_string(), "H".to_string()],
            token_symbol: "HTR".to_string(),
            auto_reward_amount: 5,
        }
    }
}

/// Server dependencies shared by every in-flight action
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: SqlitePool,
    pub disbursement: Arc<DisbursementCoordinator>,
    pub rate_limiter: Arc<RateLimiter>,
    pub sentiment: Arc<dyn BaseSentimentClassifier>,
    pub settings: EngagementSettings,
    pub admin_identifiers: Vec<MemberId>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: SqlitePool,
        disbursement: Arc<DisbursementCoordinator>,
        rate_limiter: Arc<RateLimiter>,
        sentiment: Arc<dyn BaseSentimentClassifier>,
        settings: EngagementSettings,
        admin_identifiers: Vec<MemberId>,
    ) -> Self {
        Self {
            db_pool,
            disbursement,
            rate_limiter,
            sentiment,
            settings,
            admin_identifiers,
        }
    }
}

/// Implement HasAuthContext for ServerDeps to enable authorization checks
impl HasAuthContext for ServerDeps {
    fn admin_identifiers(&self) -> &[MemberId] {
        &self.admin_identifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn wallet_rejection_keeps_reason() {
        let err = settlement_error(HathorError::Rejected("Invalid address".to_string()));
        assert_eq!(
            err.downcast::<SettlementFailure>().unwrap(),
            SettlementFailure::Rejected("Invalid address".to_string())
        );
    }

    #[test]
    fn server_errors_mean_unavailable() {
        let err = settlement_error(HathorError::Status {
            status: 503,
            body: "syncing".to_string(),
        });
        assert!(matches!(
            err.downcast::<SettlementFailure>().unwrap(),
            SettlementFailure::Unavailable(_)
        ));

        let err = settlement_error(HathorError::NotReady(Duration::from_secs(30)));
        assert!(matches!(
            err.downcast::<SettlementFailure>().unwrap(),
            SettlementFailure::Unavailable(_)
        ));
    }

    #[test]
    fn client_errors_mean_rejected() {
        let err = settlement_error(HathorError::Status {
            status: 400,
            body: "bad value".to_string(),
        });
        assert!(matches!(
            err.downcast::<SettlementFailure>().unwrap(),
            SettlementFailure::Rejected(_)
        ));
    }
}
