// HTTP server setup (Axum)
pub mod app;
pub mod routes;
pub mod shutdown;

pub use app::*;
pub use shutdown::{serve_until, shutdown_signal};
