use serde::Serialize;

use crate::catalog::{Catalog, Variant};
use crate::DEFAULT_THRESHOLD;

/// Selects variants whose stock is at or below the restock threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowStockExtractor {
    threshold: f64,
}

impl Default for LowStockExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl LowStockExtractor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_low(&self, variant: &Variant) -> bool {
        variant.inventory_quantity <= self.threshold
    }

    /// SKUs come out in traversal order; repeated SKUs are kept.
    pub fn extract(&self, catalog: &Catalog) -> LowStockReport {
        let mut skus = Vec::new();
        let mut variants_scanned = 0;
        for variant in catalog.variants() {
            variants_scanned += 1;
            if self.is_low(variant) {
                skus.push(variant.sku.clone());
            }
        }
        LowStockReport {
            skus,
            variants_scanned,
            threshold: self.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockReport {
    pub skus: Vec<String>,
    pub variants_scanned: usize,
    pub threshold: f64,
}

impl LowStockReport {
    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }
}
