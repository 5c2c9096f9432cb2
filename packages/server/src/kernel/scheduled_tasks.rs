//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! - Rate-limiter housekeeping: drop per-actor windows that have gone idle so
//!   memory stays bounded by the number of recently active actors.

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::kernel::RateLimiter;

/// Start all scheduled tasks
pub async fn start_scheduler(rate_limiter: Arc<RateLimiter>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Idle window eviction - runs every minute
    let eviction_job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let rate_limiter = rate_limiter.clone();
        Box::pin(async move {
            run_window_eviction(&rate_limiter);
        })
    })?;

    scheduler.add(eviction_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (rate-limit window eviction every minute)");
    Ok(scheduler)
}

fn run_window_eviction(rate_limiter: &RateLimiter) {
    let evicted = rate_limiter.evict_idle(Instant::now());
    if evicted > 0 {
        tracing::debug!(
            evicted,
            remaining = rate_limiter.tracked_actors(),
            "Evicted idle rate-limit windows"
        );
    }
}
