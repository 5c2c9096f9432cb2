// Main entry point for the tipbot server

use std::sync::Arc;

use anyhow::{Context, Result};
use hathor::HathorOptions;
use sqlx::sqlite::SqlitePoolOptions;
use tipbot_core::kernel::{
    create_sentiment_classifier, scheduled_tasks::start_scheduler, DisbursementCoordinator,
    EngagementSettings, HathorAdapter, RateLimiter, ServerDeps,
};
use tipbot_core::server::{build_app, serve_until, shutdown_signal};
use tipbot_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tipbot_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting community engagement tipbot");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Settlement wallet (started lazily on the first transfer)
    let settlement = HathorAdapter::new(HathorOptions {
        base_url: config.hathor_wallet_url.clone(),
        wallet_id: config.hathor_wallet_id.clone(),
        seed_key: config.hathor_seed_key.clone(),
        connect_timeout: config.settlement_connect_timeout,
        request_timeout: config.settlement_request_timeout,
    });
    let disbursement = Arc::new(DisbursementCoordinator::new(
        Arc::new(settlement),
        config.settlement_connect_timeout,
        config.settlement_request_timeout,
    ));

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_actions,
        config.rate_limit_window,
    ));

    let sentiment = create_sentiment_classifier(config.sentiment_url.clone())
        .context("Failed to create sentiment classifier")?;

    let server_deps = Arc::new(ServerDeps::new(
        pool,
        disbursement,
        rate_limiter.clone(),
        sentiment,
        EngagementSettings {
            address_prefixes: config.address_prefixes.clone(),
            token_symbol: config.token_symbol.clone(),
            auto_reward_amount: config.auto_reward_amount,
        },
        config.admin_identifiers.clone(),
    ));

    // Start scheduled tasks; stopped after the server drains
    let scheduler = start_scheduler(rate_limiter)
        .await
        .context("Failed to start scheduled tasks")?;

    // Build application
    let app = build_app(server_deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Webhook: http://localhost:{}/messages", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    serve_until(listener, app, shutdown_signal(), scheduler).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
