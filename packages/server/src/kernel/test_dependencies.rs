// TestDependencies - mock implementations for testing
//
// Provides mock collaborators that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BaseSentimentClassifier, BaseSettlementClient, BaseSettlementHandle, DisbursementCoordinator,
    EngagementSettings, RateLimiter, ServerDeps,
};
use crate::common::MemberId;

// =============================================================================
// Mock Settlement Network
// =============================================================================

pub struct MockSettlementHandle {
    submissions: Mutex<Vec<(String, u64)>>,
    rejections: Mutex<VecDeque<String>>,
    submit_delay: Duration,
    balance: AtomicU64,
    tx_counter: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSettlementHandle {
    fn new() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            rejections: Mutex::new(VecDeque::new()),
            submit_delay: Duration::ZERO,
            balance: AtomicU64::new(0),
            tx_counter: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BaseSettlementHandle for MockSettlementHandle {
    async fn submit(&self, address: &str, amount: u64) -> Result<String> {
        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);

        self.submissions
            .lock()
            .unwrap()
            .push((address.to_string(), amount));

        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }

        let rejection = self.rejections.lock().unwrap().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match rejection {
            Some(reason) => Err(anyhow::anyhow!(reason)),
            None => {
                let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("tx-{:04}", n))
            }
        }
    }

    async fn balance(&self) -> Result<u64> {
        Ok(self.balance.load(Ordering::SeqCst))
    }
}

/// Settlement client whose handle records every submission.
///
/// Configure with the builder methods before handing it to a coordinator:
/// ```ignore
/// let client = Arc::new(MockSettlementClient::new().failing_init(1));
/// ```
pub struct MockSettlementClient {
    handle: Arc<MockSettlementHandle>,
    init_failures: AtomicUsize,
    init_calls: AtomicUsize,
    init_delay: Duration,
}

impl MockSettlementClient {
    pub fn new() -> Self {
        Self {
            handle: Arc::new(MockSettlementHandle::new()),
            init_failures: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
            init_delay: Duration::ZERO,
        }
    }

    /// The next `n` init attempts fail
    pub fn failing_init(self, n: usize) -> Self {
        self.init_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.handle_mut().submit_delay = delay;
        self
    }

    /// Queue a rejection for the next submission
    pub fn with_rejection(self, reason: impl Into<String>) -> Self {
        self.handle.rejections.lock().unwrap().push_back(reason.into());
        self
    }

    pub fn with_balance(self, balance: u64) -> Self {
        self.handle.balance.store(balance, Ordering::SeqCst);
        self
    }

    fn handle_mut(&mut self) -> &mut MockSettlementHandle {
        Arc::get_mut(&mut self.handle).expect("configure the mock before sharing it")
    }

    /// Queue a rejection after the mock has been shared
    pub fn reject_next(&self, reason: impl Into<String>) {
        self.handle.rejections.lock().unwrap().push_back(reason.into());
    }

    /// Number of init attempts so far
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Every (address, amount) submitted, in order
    pub fn submissions(&self) -> Vec<(String, u64)> {
        self.handle.submissions.lock().unwrap().clone()
    }

    /// Highest number of submissions observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.handle.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockSettlementClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSettlementClient for MockSettlementClient {
    async fn init(&self) -> Result<Arc<dyn BaseSettlementHandle>> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);

        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }

        let failed = self
            .init_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            anyhow::bail!("wallet failed to start");
        }

        Ok(self.handle.clone())
    }
}

// =============================================================================
// Mock Sentiment Classifier
// =============================================================================

pub struct MockSentimentClassifier {
    score: Mutex<Option<f64>>,
    calls: Mutex<Vec<String>>,
}

impl MockSentimentClassifier {
    /// Classifier that returns `score` for every message
    pub fn scoring(score: f64) -> Self {
        Self {
            score: Mutex::new(Some(score)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Classifier whose every call fails
    pub fn failing() -> Self {
        Self {
            score: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_score(&self, score: f64) {
        *self.score.lock().unwrap() = Some(score);
    }

    /// Get all texts that were classified
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseSentimentClassifier for MockSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<f64> {
        self.calls.lock().unwrap().push(text.to_string());
        match *self.score.lock().unwrap() {
            Some(score) => Ok(score),
            None => anyhow::bail!("classifier unavailable"),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builder for ServerDeps wired to mocks
pub struct TestDependencies {
    pub settlement: Arc<MockSettlementClient>,
    pub sentiment: Arc<MockSentimentClassifier>,
    pub rate_limiter: Arc<RateLimiter>,
    pub settings: EngagementSettings,
    pub admin_identifiers: Vec<MemberId>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            settlement: Arc::new(MockSettlementClient::new()),
            sentiment: Arc::new(MockSentimentClassifier::scoring(0.0)),
            rate_limiter: Arc::new(RateLimiter::default()),
            settings: EngagementSettings::default(),
            admin_identifiers: Vec::new(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_settlement(mut self, settlement: MockSettlementClient) -> Self {
        self.settlement = Arc::new(settlement);
        self
    }

    pub fn with_sentiment(mut self, sentiment: MockSentimentClassifier) -> Self {
        self.sentiment = Arc::new(sentiment);
        self
    }

    pub fn with_rate_limit(mut self, max_actions: usize, window: Duration) -> Self {
        self.rate_limiter = Arc::new(RateLimiter::new(max_actions, window));
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    pub fn with_admin(mut self, handle: &str) -> Self {
        self.admin_identifiers.push(MemberId::new(handle));
        self
    }

    /// Build ServerDeps that share this builder's mocks
    pub fn server_deps(&self, db_pool: SqlitePool) -> ServerDeps {
        let disbursement = Arc::new(DisbursementCoordinator::new(
            self.settlement.clone(),
            self.connect_timeout,
            self.request_timeout,
        ));

        ServerDeps::new(
            db_pool,
            disbursement,
            self.rate_limiter.clone(),
            self.sentiment.clone(),
            self.settings.clone(),
            self.admin_identifiers.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
