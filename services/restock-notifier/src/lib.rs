pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod server;
pub mod task;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::catalog::{Catalog, Product, ProductCollection, Variant};
pub use crate::config::{NotifyConfig, RestockConfig, ShopCredentials, ShopifyConfig, Transport};
pub use crate::dispatcher::{
    compose_message, DispatchReceipt, LogNotificationSink, NotificationDispatcher, NotificationSink,
    WebhookNotificationSink,
};
#[cfg(any(feature = "kafka", feature = "kafka-producer"))]
pub use crate::dispatcher::KafkaNotificationSink;
pub use crate::error::{DispatchError, FetchError, MalformedDocument, RestockError, RestockResult};
pub use crate::extractor::{LowStockExtractor, LowStockReport};
pub use crate::fetcher::{CatalogFetcher, ShopifyCatalogFetcher};
pub use crate::task::{InvocationOutcome, InvocationReport, RestockTask};

/// Variants with `inventory_quantity` at or below this are reported.
pub const DEFAULT_THRESHOLD: f64 = 10.0;
pub const DEFAULT_TOPIC: &str = "inventory.low_stock";
