// src/services/scheduler.rs
use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::services::AppState;
use crate::BoxError;

/// Every 15 minutes, on the minute.
pub const PORTFOLIO_REFRESH_SCHEDULE: &str = "0 */15 * * * *";

/// Re-downloads the daily history of every portfolio member. Returns how many
/// refreshed successfully.
pub async fn refresh_portfolio(state: &Arc<AppState>) -> usize {
    let mut refreshed = 0;
    for symbol in &state.config.portfolio {
        match state.yahoo.fetch_history(symbol).await {
            Ok(history) if !history.prices.is_empty() => {
                state.store.put_history(symbol, history.prices, Utc::now()).await;
                refreshed += 1;
            }
            Ok(_) => error!("Empty history returned for portfolio member {}", symbol),
            Err(e) => error!("Failed to refresh portfolio member {}: {}", symbol, e),
        }
    }
    info!("Refreshed {}/{} portfolio histories", refreshed, state.config.portfolio.len());
    refreshed
}

pub async fn start_scheduler(state: Arc<AppState>) -> Result<JobScheduler, BoxError> {
    let sched = JobScheduler::new()
        .await
        .map_err(|e| format!("Failed to create scheduler: {:?}", e))?;

    let job_state = state.clone();
    let job = Job::new_async(PORTFOLIO_REFRESH_SCHEDULE, move |_uuid, _lock| {
        let state = job_state.clone();
        Box::pin(async move {
            info!("Running scheduled portfolio refresh");
            refresh_portfolio(&state).await;
        })
    })
    .map_err(|e| format!("Failed to create portfolio refresh job: {:?}", e))?;

    sched
        .add(job)
        .await
        .map_err(|e| format!("Failed to schedule portfolio refresh: {:?}", e))?;
    sched
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {:?}", e))?;
    info!("Portfolio refresh scheduled ({})", PORTFOLIO_REFRESH_SCHEDULE);

    tokio::spawn(async move {
        refresh_portfolio(&state).await;
    });

    Ok(sched)
}
