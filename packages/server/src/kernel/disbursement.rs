//! Disbursement coordinator - the single choke point for outbound transfers.
//!
//! The settlement resource (a started wallet) is expensive to initialize and
//! must not see concurrent submissions. The coordinator owns the lazily
//! created handle behind a `tokio::sync::Mutex`, which queues waiters in FIFO
//! order, and holds the lock for the whole init + submit sequence.
//!
//! ```text
//! transfer(req) ──► lock (FIFO) ──► handle? ──no──► init (connect_timeout)
//!                                      │                 │ err → slot stays empty
//!                                      ▼                 ▼
//!                               submit (request_timeout) ──► TransactionId | SettlementFailure
//! ```
//!
//! Failures are returned verbatim; nothing here retries a transfer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::common::MemberId;
use crate::kernel::traits::{BaseSettlementClient, BaseSettlementHandle};

/// Why a value-moving action was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Tip,
    Reward,
    AutoReward,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Tip => "tip",
            TransferKind::Reward => "reward",
            TransferKind::AutoReward => "auto_reward",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound transfer. Built by the dispatcher, consumed by `transfer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub kind: TransferKind,
    pub actor_id: MemberId,
    pub recipient_id: MemberId,
    pub recipient_address: String,
    pub amount: u64,
}

/// Opaque network transaction id, for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementFailure {
    #[error("settlement timed out")]
    Timeout,

    #[error("settlement resource unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Rejected(String),
}

pub struct DisbursementCoordinator {
    client: Arc<dyn BaseSettlementClient>,
    handle: Mutex<Option<Arc<dyn BaseSettlementHandle>>>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl DisbursementCoordinator {
    pub fn new(
        client: Arc<dyn BaseSettlementClient>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            handle: Mutex::new(None),
            connect_timeout,
            request_timeout,
        }
    }

    /// Submit one transfer through the shared resource.
    pub async fn transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransactionId, SettlementFailure> {
        let mut slot = self.handle.lock().await;
        let handle = self.ensure_handle(&mut slot).await?;

        debug!(
            kind = %request.kind,
            recipient = %request.recipient_id,
            amount = request.amount,
            "Submitting transfer"
        );

        let submitted = timeout(
            self.request_timeout,
            handle.submit(&request.recipient_address, request.amount),
        )
        .await;

        match submitted {
            Ok(Ok(tx_id)) => {
                info!(
                    kind = %request.kind,
                    recipient = %request.recipient_id,
                    amount = request.amount,
                    tx_id = %tx_id,
                    "Transfer settled"
                );
                Ok(TransactionId(tx_id))
            }
            Ok(Err(e)) => {
                let failure = into_failure(e);
                warn!(kind = %request.kind, error = %failure, "Transfer failed");
                Err(failure)
            }
            Err(_) => {
                warn!(
                    kind = %request.kind,
                    timeout = ?self.request_timeout,
                    "Transfer submission timed out"
                );
                Err(SettlementFailure::Timeout)
            }
        }
    }

    /// Spendable balance of the shared wallet
    pub async fn balance(&self) -> Result<u64, SettlementFailure> {
        let mut slot = self.handle.lock().await;
        let handle = self.ensure_handle(&mut slot).await?;

        match timeout(self.request_timeout, handle.balance()).await {
            Ok(Ok(balance)) => Ok(balance),
            Ok(Err(e)) => Err(into_failure(e)),
            Err(_) => Err(SettlementFailure::Timeout),
        }
    }

    /// Whether a live handle is currently cached
    pub async fn is_initialized(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    /// Snapshot for health checks without queueing behind transfers:
    /// "busy" while a transfer or initialization holds the lock.
    pub fn state(&self) -> &'static str {
        match self.handle.try_lock() {
            Ok(slot) if slot.is_some() => "ready",
            Ok(_) => "idle",
            Err(_) => "busy",
        }
    }

    async fn ensure_handle(
        &self,
        slot: &mut Option<Arc<dyn BaseSettlementHandle>>,
    ) -> Result<Arc<dyn BaseSettlementHandle>, SettlementFailure> {
        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        info!("Initializing settlement resource");
        match timeout(self.connect_timeout, self.client.init()).await {
            Ok(Ok(handle)) => {
                info!("Settlement resource ready");
                *slot = Some(handle.clone());
                Ok(handle)
            }
            // Slot stays empty so the next request starts over
            Ok(Err(e)) => {
                warn!(error = %e, "Settlement resource initialization failed");
                Err(match e.downcast::<SettlementFailure>() {
                    Ok(SettlementFailure::Timeout) => SettlementFailure::Timeout,
                    Ok(SettlementFailure::Unavailable(reason)) => {
                        SettlementFailure::Unavailable(reason)
                    }
                    Ok(failure) => SettlementFailure::Unavailable(failure.to_string()),
                    Err(other) => SettlementFailure::Unavailable(format!("{:#}", other)),
                })
            }
            Err(_) => {
                warn!(timeout = ?self.connect_timeout, "Settlement resource initialization timed out");
                Err(SettlementFailure::Timeout)
            }
        }
    }
}

/// Adapters may return a `SettlementFailure` inside the anyhow error to pick
/// the category; anything else is a rejection with the error text.
fn into_failure(error: anyhow::Error) -> SettlementFailure {
    match error.downcast::<SettlementFailure>() {
        Ok(failure) => failure,
        Err(other) => SettlementFailure::Rejected(format!("{:#}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockSettlementClient;

    fn request(amount: u64) -> TransferRequest {
        TransferRequest {
            kind: TransferKind::Tip,
            actor_id: MemberId::new("bob"),
            recipient_id: MemberId::new("alice"),
            recipient_address: "W123".to_string(),
            amount,
        }
    }

    fn coordinator(client: Arc<MockSettlementClient>) -> DisbursementCoordinator {
        DisbursementCoordinator::new(client, Duration::from_secs(1), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn initializes_once_and_reuses_handle() {
        let client = Arc::new(MockSettlementClient::new());
        let coordinator = coordinator(client.clone());

        let first = coordinator.transfer(&request(10)).await.unwrap();
        let second = coordinator.transfer(&request(20)).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(client.init_calls(), 1);
        assert_eq!(
            client.submissions(),
            vec![("W123".to_string(), 10), ("W123".to_string(), 20)]
        );
    }

    #[tokio::test]
    async fn failed_init_is_not_cached() {
        let client = Arc::new(MockSettlementClient::new().failing_init(1));
        let coordinator = coordinator(client.clone());

        let result = coordinator.transfer(&request(10)).await;
        assert!(matches!(result, Err(SettlementFailure::Unavailable(_))));
        assert!(!coordinator.is_initialized().await);
        assert!(client.submissions().is_empty());

        coordinator.transfer(&request(10)).await.unwrap();
        assert_eq!(client.init_calls(), 2);
        assert!(coordinator.is_initialized().await);
    }

    #[tokio::test]
    async fn slow_init_reports_timeout() {
        let client = Arc::new(MockSettlementClient::new().with_init_delay(Duration::from_millis(200)));
        let coordinator = DisbursementCoordinator::new(
            client.clone(),
            Duration::from_millis(20),
            Duration::from_secs(1),
        );

        let result = coordinator.transfer(&request(10)).await;

        assert_eq!(result, Err(SettlementFailure::Timeout));
        assert!(!coordinator.is_initialized().await);
        assert_eq!(coordinator.state(), "idle");
    }

    #[tokio::test]
    async fn slow_submission_reports_timeout_and_keeps_handle() {
        let client =
            Arc::new(MockSettlementClient::new().with_submit_delay(Duration::from_millis(200)));
        let coordinator = DisbursementCoordinator::new(
            client.clone(),
            Duration::from_secs(1),
            Duration::from_millis(20),
        );

        let result = coordinator.transfer(&request(10)).await;

        assert_eq!(result, Err(SettlementFailure::Timeout));
        assert!(coordinator.is_initialized().await);
    }

    #[tokio::test]
    async fn rejection_is_surfaced_verbatim_without_retry() {
        let client =
            Arc::new(MockSettlementClient::new().with_rejection("Insufficient amount of tokens"));
        let coordinator = coordinator(client.clone());

        let result = coordinator.transfer(&request(10)).await;

        assert_eq!(
            result,
            Err(SettlementFailure::Rejected(
                "Insufficient amount of tokens".to_string()
            ))
        );
        assert_eq!(client.submissions().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_transfers_never_overlap() {
        let client =
            Arc::new(MockSettlementClient::new().with_submit_delay(Duration::from_millis(10)));
        let coordinator = Arc::new(coordinator(client.clone()));

        let tasks: Vec<_> = (1..=8)
            .map(|amount| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.transfer(&request(amount)).await })
            })
            .collect();

        for task in futures::future::join_all(tasks).await {
            assert!(task.unwrap().is_ok());
        }

        assert_eq!(client.submissions().len(), 8);
        assert_eq!(client.max_in_flight(), 1);
        assert_eq!(client.init_calls(), 1);
    }

    #[tokio::test]
    async fn balance_goes_through_the_same_handle() {
        let client = Arc::new(MockSettlementClient::new().with_balance(1_000));
        let coordinator = coordinator(client.clone());

        assert_eq!(coordinator.balance().await, Ok(1_000));
        coordinator.transfer(&request(10)).await.unwrap();
        assert_eq!(client.init_calls(), 1);
    }

    #[test]
    fn typed_failure_survives_anyhow() {
        let err = anyhow::Error::new(SettlementFailure::Unavailable("node down".to_string()));
        assert_eq!(
            into_failure(err),
            SettlementFailure::Unavailable("node down".to_string())
        );
        assert_eq!(
            into_failure(anyhow::anyhow!("bad address")),
            SettlementFailure::Rejected("bad address".to_string())
        );
    }
}
