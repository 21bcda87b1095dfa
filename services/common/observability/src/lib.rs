use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Outcome labels recorded on `restock_invocations_total`.
pub const OUTCOME_LABELS: [&str; 5] = [
    "dispatched",
    "empty",
    "dispatch_failed",
    "fetch_failed",
    "malformed",
];

#[derive(Clone)]
pub struct RestockMetrics {
    pub registry: Registry,
    pub invocations_total: IntCounterVec,
    pub variants_scanned_total: IntCounter,
    pub low_stock_variants: IntGauge,
    pub dispatch_failures_total: IntCounter,
    pub fetch_duration_seconds: Histogram,
}

impl RestockMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let invocations_total = IntCounterVec::new(
            Opts::new(
                "restock_invocations_total",
                "Restock check invocations grouped by outcome",
            ),
            &["outcome"],
        )?;
        let variants_scanned_total = IntCounter::new(
            "restock_variants_scanned_total",
            "Variants inspected across all invocations",
        )?;
        let low_stock_variants = IntGauge::new(
            "restock_low_stock_variants",
            "Variants at or below threshold in the latest catalog scan",
        )?;
        let dispatch_failures_total = IntCounter::new(
            "restock_dispatch_failures_total",
            "Low-stock notifications the sink rejected or failed to deliver",
        )?;
        let fetch_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "restock_fetch_duration_seconds",
                "Time spent retrieving the product catalog",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(invocations_total.clone()))?;
        registry.register(Box::new(variants_scanned_total.clone()))?;
        registry.register(Box::new(low_stock_variants.clone()))?;
        registry.register(Box::new(dispatch_failures_total.clone()))?;
        registry.register(Box::new(fetch_duration_seconds.clone()))?;
        // Pre-create every outcome series so dashboards see zeroes before the first run.
        for outcome in OUTCOME_LABELS {
            invocations_total.with_label_values(&[outcome]);
        }
        Ok(Self {
            registry,
            invocations_total,
            variants_scanned_total,
            low_stock_variants,
            dispatch_failures_total,
            fetch_duration_seconds,
        })
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.invocations_total.with_label_values(&[outcome]).inc();
    }

    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.invocations_total.with_label_values(&[outcome]).get()
    }

    /// Prometheus text exposition of every registered family.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}
