// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Ledger and dispatch rules live in the domains and call through these traits.
//
// Naming convention: Base* for trait names (e.g., BaseSettlementClient)

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// Sentiment Classifier Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseSentimentClassifier: Send + Sync {
    /// Polarity of a chat message. Anything above zero counts as positive.
    async fn classify(&self, text: &str) -> Result<f64>;
}

// =============================================================================
// Settlement Network Traits (Infrastructure - value transfer)
// =============================================================================

/// Factory for the settlement resource.
///
/// Credentials live in the implementation's own configuration. `init` is
/// expensive (wallet start + sync) and is only called by the disbursement
/// coordinator when it has no live handle.
#[async_trait]
pub trait BaseSettlementClient: Send + Sync {
    async fn init(&self) -> Result<Arc<dyn BaseSettlementHandle>>;
}

/// An initialized settlement resource. Not safe for concurrent submissions;
/// callers go through `DisbursementCoordinator`.
#[async_trait]
pub trait BaseSettlementHandle: Send + Sync {
    /// Submit a transfer and return the network transaction id
    async fn submit(&self, address: &str, amount: u64) -> Result<String>;

    /// Spendable balance of the shared wallet, in whole units
    async fn balance(&self) -> Result<u64>;
}
