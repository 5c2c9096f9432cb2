//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::chat::ActionDispatcher;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    health_handler, member_balance_handler, member_transactions_handler, message_handler,
    proposals_handler, wallet_balance_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub dispatcher: ActionDispatcher,
    pub server_deps: Arc<ServerDeps>,
}

impl AppState {
    pub fn new(server_deps: Arc<ServerDeps>) -> Self {
        Self {
            db_pool: server_deps.db_pool.clone(),
            dispatcher: ActionDispatcher::new(server_deps.clone()),
            server_deps,
        }
    }
}

/// Build the Axum application router
pub fn build_app(server_deps: Arc<ServerDeps>) -> Router {
    let app_state = AppState::new(server_deps);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        // Transport webhook
        .route("/messages", post(message_handler))
        // Read-only reports
        .route("/members/:id/balance", get(member_balance_handler))
        .route("/members/:id/transactions", get(member_transactions_handler))
        .route("/proposals", get(proposals_handler))
        .route("/wallet/balance", get(wallet_balance_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
