use anyhow::Context;
use common_observability::RestockMetrics;
use restock_notifier::server::ops_router;
use restock_notifier::{InvocationOutcome, RestockConfig, RestockTask};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RestockConfig::from_env()?;
    let metrics = Arc::new(RestockMetrics::new().context("failed to register metrics")?);
    let task = RestockTask::from_config(&config, metrics.clone())?;

    let Some(period) = config.schedule else {
        // One-shot: fatal errors propagate and exit non-zero.
        let report = task.run_invocation().await?;
        if let InvocationOutcome::DispatchFailed { error } = &report.outcome {
            warn!(invocation_id = %report.invocation_id, %error, "Invocation completed without delivering notification");
        }
        info!(
            invocation_id = %report.invocation_id,
            outcome = report.outcome.label(),
            low_stock = report.low_stock_skus.len(),
            "Restock check finished"
        );
        return Ok(());
    };

    spawn_schedule(task, period);

    let addr = config.listen_addr;
    info!(%addr, period_secs = period.as_secs(), "starting restock-notifier");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, ops_router(metrics)).await?;
    Ok(())
}

fn spawn_schedule(task: RestockTask, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match task.run_invocation().await {
                Ok(report) => {
                    info!(
                        invocation_id = %report.invocation_id,
                        outcome = report.outcome.label(),
                        low_stock = report.low_stock_skus.len(),
                        "Scheduled restock check finished"
                    );
                }
                Err(err) => {
                    error!(error = %err, "Scheduled restock check failed");
                }
            }
        }
    });
}
