//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod disbursement;
pub mod rate_limiter;
pub mod scheduled_tasks;
pub mod sentiment;
pub mod test_dependencies;
pub mod traits;

pub use deps::{EngagementSettings, HathorAdapter, ServerDeps};
pub use disbursement::{
    DisbursementCoordinator, SettlementFailure, TransactionId, TransferKind, TransferRequest,
};
pub use rate_limiter::{Admission, RateLimiter};
pub use sentiment::{create_sentiment_classifier, HttpSentimentClassifier, NoopSentimentClassifier};
pub use test_dependencies::TestDependencies;
pub use traits::*;
