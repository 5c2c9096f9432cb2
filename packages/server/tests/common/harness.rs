//! Test harness over an in-memory SQLite database and mock collaborators.
//!
//! Every harness gets its own database, so tests never share ledger state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use test_context::AsyncTestContext;
use tipbot_core::domains::chat::{ActionDispatcher, InboundMessage};
use tipbot_core::kernel::test_dependencies::{MockSentimentClassifier, MockSettlementClient};
use tipbot_core::kernel::{ServerDeps, TestDependencies};
use tipbot_core::server::build_app;

pub const ADMIN: &str = "admin";

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut TestHarness) {
///     let reply = ctx.send("bob", "/help").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub db_pool: SqlitePool,
    pub deps: TestDependencies,
    pub server_deps: Arc<ServerDeps>,
    pub dispatcher: ActionDispatcher,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    /// Harness with one configured admin and a rate limit loose enough that
    /// ordinary tests never hit it.
    pub async fn new() -> Result<Self> {
        Self::with_deps(
            TestDependencies::new()
                .with_admin(ADMIN)
                .with_rate_limit(1_000, Duration::from_secs(1)),
        )
        .await
    }

    pub async fn with_deps(deps: TestDependencies) -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let db_pool = memory_pool().await?;
        let server_deps = Arc::new(deps.server_deps(db_pool.clone()));
        let dispatcher = ActionDispatcher::new(server_deps.clone());

        Ok(Self {
            db_pool,
            deps,
            server_deps,
            dispatcher,
        })
    }

    /// Deliver a message from a regular member
    pub async fn send(&self, actor: &str, text: &str) -> Option<String> {
        self.dispatcher
            .handle(&InboundMessage::new(actor, text))
            .await
    }

    /// Deliver a message the transport marks as coming from a chat admin
    pub async fn send_as_admin(&self, actor: &str, text: &str) -> Option<String> {
        self.dispatcher
            .handle(&InboundMessage::new(actor, text).as_admin())
            .await
    }

    /// Command reply; panics when the dispatcher stayed silent
    pub async fn reply(&self, actor: &str, text: &str) -> String {
        self.send(actor, text)
            .await
            .unwrap_or_else(|| panic!("no reply to {text:?}"))
    }

    pub fn settlement(&self) -> &MockSettlementClient {
        &self.deps.settlement
    }

    pub fn sentiment(&self) -> &MockSentimentClassifier {
        &self.deps.sentiment
    }

    /// HTTP router over the same dependencies
    pub fn app(&self) -> Router {
        build_app(self.server_deps.clone())
    }
}

/// A single-connection in-memory database with migrations applied.
///
/// One connection that never expires: each connection to `sqlite::memory:`
/// is a separate database.
pub async fn memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}
