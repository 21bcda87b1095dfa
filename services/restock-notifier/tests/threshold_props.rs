use proptest::prelude::*;
use restock_notifier::{Catalog, LowStockExtractor};
use serde_json::json;

proptest! {
    // A variant is reported exactly when its quantity is at or below the threshold.
    #[test]
    fn sku_reported_iff_at_or_below_threshold(quantity in -1_000.0f64..1_000.0, threshold in 0i32..50) {
        let document = json!({ "products": [ { "variants": [ { "sku": "P", "inventory_quantity": quantity } ] } ] });
        let catalog = Catalog::from_value(&document).unwrap();
        let report = LowStockExtractor::new(f64::from(threshold)).extract(&catalog);
        prop_assert_eq!(report.skus.len() == 1, quantity <= f64::from(threshold));
    }

    // Output length never exceeds the number of variants and order follows the input.
    #[test]
    fn result_is_ordered_subsequence_of_variants(quantities in proptest::collection::vec(0u32..30, 0..40)) {
        let variants: Vec<_> = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| json!({ "sku": format!("SKU{i}"), "inventory_quantity": q }))
            .collect();
        let catalog = Catalog::from_value(&json!({ "products": [ { "variants": variants } ] })).unwrap();
        let report = LowStockExtractor::default().extract(&catalog);

        let expected: Vec<String> = quantities
            .iter()
            .enumerate()
            .filter(|(_, q)| **q <= 10)
            .map(|(i, _)| format!("SKU{i}"))
            .collect();
        prop_assert_eq!(report.skus, expected);
        prop_assert_eq!(report.variants_scanned, quantities.len());
    }
}
