//! Serving until shutdown, then stopping background jobs.

use std::future::Future;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio_cron_scheduler::JobScheduler;

/// Serve `app` until `signal` resolves, then stop the scheduler.
///
/// In-flight requests are allowed to finish before the listener closes.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    mut scheduler: JobScheduler,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .context("Server error")?;

    tracing::info!("Server stopped, shutting down scheduled tasks");
    scheduler
        .shutdown()
        .await
        .context("Failed to stop scheduled tasks")?;

    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::routing::get;
    use tokio::sync::oneshot;

    use crate::kernel::scheduled_tasks::start_scheduler;
    use crate::kernel::RateLimiter;

    #[tokio::test(flavor = "multi_thread")]
    async fn server_and_scheduler_stop_when_signalled() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/", get(|| async { "ok" }));
        let scheduler = start_scheduler(Arc::new(RateLimiter::default()))
            .await
            .unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let signal = async move {
            let _ = stopped.await;
        };
        let server = tokio::spawn(serve_until(listener, app, signal, scheduler));

        let body = reqwest::get(format!("http://{addr}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");

        stop.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
