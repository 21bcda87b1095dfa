use anyhow::Context;
use chrono::{DateTime, Utc};
use common_observability::RestockMetrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::RestockConfig;
use crate::dispatcher::{build_sink, NotificationDispatcher};
use crate::error::{RestockError, RestockResult};
use crate::extractor::LowStockExtractor;
use crate::fetcher::{CatalogFetcher, ShopifyCatalogFetcher};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// No variant was at or below the threshold; nothing was published.
    NothingToReport,
    Dispatched { message_id: String },
    /// Soft failure: the scan succeeded but the notification did not go out.
    DispatchFailed { error: String },
}

impl InvocationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            InvocationOutcome::NothingToReport => "empty",
            InvocationOutcome::Dispatched { .. } => "dispatched",
            InvocationOutcome::DispatchFailed { .. } => "dispatch_failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub invocation_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub variants_scanned: usize,
    pub low_stock_skus: Vec<String>,
    pub outcome: InvocationOutcome,
}

/// One fetch, extract, dispatch cycle per call to [`RestockTask::run_invocation`].
#[derive(Clone)]
pub struct RestockTask {
    fetcher: Arc<dyn CatalogFetcher>,
    extractor: LowStockExtractor,
    dispatcher: NotificationDispatcher,
    metrics: Arc<RestockMetrics>,
}

impl RestockTask {
    pub fn new(
        fetcher: Arc<dyn CatalogFetcher>,
        extractor: LowStockExtractor,
        dispatcher: NotificationDispatcher,
        metrics: Arc<RestockMetrics>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            dispatcher,
            metrics,
        }
    }

    pub fn from_config(config: &RestockConfig, metrics: Arc<RestockMetrics>) -> anyhow::Result<Self> {
        let fetcher = ShopifyCatalogFetcher::new(&config.shopify)
            .context("failed to build catalog HTTP client")?;
        info!(url = %fetcher.url(), "Configured Shopify catalog fetcher");
        let sink = build_sink(&config.notify, &config.shopify.credentials.shop_domain)?;
        info!(
            transport = ?config.notify.transport,
            topic = %config.notify.topic,
            threshold = config.threshold,
            "Configured low-stock notification"
        );
        Ok(Self::new(
            Arc::new(fetcher),
            LowStockExtractor::new(config.threshold),
            NotificationDispatcher::new(config.notify.topic.clone(), sink),
            metrics,
        ))
    }

    /// Fetch and shape errors abort the invocation. A failed publish is logged and
    /// reported through [`InvocationOutcome::DispatchFailed`] instead.
    pub async fn run_invocation(&self) -> RestockResult<InvocationReport> {
        let invocation_id = Uuid::new_v4();
        let started_at = Utc::now();
        match self.scan_and_notify(invocation_id, started_at).await {
            Ok(report) => {
                self.metrics.record_outcome(report.outcome.label());
                Ok(report)
            }
            Err(err) => {
                error!(%invocation_id, error = %err, "Restock invocation aborted");
                self.metrics.record_outcome(err.outcome_label());
                Err(err)
            }
        }
    }

    async fn scan_and_notify(
        &self,
        invocation_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<InvocationReport, RestockError> {
        let fetch_started = Instant::now();
        let document = self.fetcher.fetch().await?;
        self.metrics
            .fetch_duration_seconds
            .observe(fetch_started.elapsed().as_secs_f64());

        let catalog = Catalog::from_value(&document)?;
        let report = self.extractor.extract(&catalog);
        self.metrics
            .variants_scanned_total
            .inc_by(report.variants_scanned as u64);
        self.metrics.low_stock_variants.set(report.skus.len() as i64);

        let outcome = match self.dispatcher.dispatch(&report).await {
            None => {
                info!(
                    %invocation_id,
                    variants = report.variants_scanned,
                    threshold = report.threshold,
                    "No variants at or below threshold; skipping notification"
                );
                InvocationOutcome::NothingToReport
            }
            Some(Ok(receipt)) => {
                info!(
                    %invocation_id,
                    topic = %self.dispatcher.topic(),
                    message_id = %receipt.message_id,
                    skus = report.skus.len(),
                    "Published low-stock notification"
                );
                InvocationOutcome::Dispatched {
                    message_id: receipt.message_id,
                }
            }
            Some(Err(err)) => {
                error!(
                    %invocation_id,
                    topic = %self.dispatcher.topic(),
                    error = %err,
                    skus = report.skus.len(),
                    "Failed to publish low-stock notification"
                );
                self.metrics.dispatch_failures_total.inc();
                InvocationOutcome::DispatchFailed {
                    error: err.to_string(),
                }
            }
        };

        Ok(InvocationReport {
            invocation_id,
            started_at,
            variants_scanned: report.variants_scanned,
            low_stock_skus: report.skus,
            outcome,
        })
    }
}
