use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{NotifyConfig, Transport};
use crate::error::DispatchError;
use crate::extractor::LowStockReport;

/// Separator between SKUs in the published message.
pub const SKU_SEPARATOR: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    pub message_id: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, topic: &str, message: &str) -> Result<DispatchReceipt, DispatchError>;
}

/// Joins SKUs into the notification body; `None` when there is nothing to send.
pub fn compose_message(skus: &[String]) -> Option<String> {
    if skus.is_empty() {
        return None;
    }
    Some(skus.join(SKU_SEPARATOR))
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    topic: String,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(topic: impl Into<String>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            topic: topic.into(),
            sink,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publishes the report as one message. The sink is not called for an empty report.
    pub async fn dispatch(
        &self,
        report: &LowStockReport,
    ) -> Option<Result<DispatchReceipt, DispatchError>> {
        let message = compose_message(&report.skus)?;
        Some(self.sink.publish(&self.topic, &message).await)
    }
}

/// Dry-run sink: the message only reaches the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn publish(&self, topic: &str, message: &str) -> Result<DispatchReceipt, DispatchError> {
        let message_id = Uuid::new_v4().to_string();
        info!(topic, message, message_id = %message_id, "Low-stock notification (log transport)");
        Ok(DispatchReceipt { message_id })
    }
}

/// Posts `{"topic", "message"}` as JSON to an HTTP endpoint.
#[derive(Clone)]
pub struct WebhookNotificationSink {
    client: Client,
    url: String,
    bearer: Option<String>,
}

impl WebhookNotificationSink {
    pub fn new(url: impl Into<String>, bearer: Option<String>) -> Self {
        Self::with_client(Client::new(), url, bearer)
    }

    pub fn with_client(client: Client, url: impl Into<String>, bearer: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            bearer,
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    async fn publish(&self, topic: &str, message: &str) -> Result<DispatchReceipt, DispatchError> {
        let mut req = self
            .client
            .post(&self.url)
            .json(&json!({ "topic": topic, "message": message }));
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            warn!(status = ?response.status(), "Restock webhook returned failure status");
            return Err(DispatchError::Rejected {
                status: response.status().as_u16(),
            });
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Ok(DispatchReceipt { message_id })
    }
}

#[cfg(any(feature = "kafka", feature = "kafka-producer"))]
pub use kafka::KafkaNotificationSink;

#[cfg(any(feature = "kafka", feature = "kafka-producer"))]
mod kafka {
    use super::*;
    use rdkafka::producer::{FutureProducer, FutureRecord};
    use std::time::Duration;

    #[derive(Clone)]
    pub struct KafkaNotificationSink {
        producer: FutureProducer,
        key: String,
    }

    impl KafkaNotificationSink {
        pub fn new(producer: FutureProducer, key: impl Into<String>) -> Self {
            Self {
                producer,
                key: key.into(),
            }
        }

        pub fn from_bootstrap(bootstrap: &str, key: impl Into<String>) -> Result<Self, DispatchError> {
            let producer: FutureProducer = rdkafka::ClientConfig::new()
                .set("bootstrap.servers", bootstrap)
                .set("message.timeout.ms", "5000")
                .create()
                .map_err(|err| DispatchError::Transport(err.to_string()))?;
            Ok(Self::new(producer, key))
        }
    }

    #[async_trait]
    impl NotificationSink for KafkaNotificationSink {
        async fn publish(&self, topic: &str, message: &str) -> Result<DispatchReceipt, DispatchError> {
            let (partition, offset) = self
                .producer
                .send(
                    FutureRecord::to(topic).payload(message).key(self.key.as_str()),
                    Duration::from_secs(0),
                )
                .await
                .map_err(|(err, _)| DispatchError::Transport(err.to_string()))?;
            Ok(DispatchReceipt {
                message_id: format!("{partition}:{offset}"),
            })
        }
    }
}

/// Builds the sink selected by `RESTOCK_TRANSPORT`.
pub fn build_sink(config: &NotifyConfig, shop_domain: &str) -> Result<Arc<dyn NotificationSink>> {
    match config.transport {
        Transport::Log => Ok(Arc::new(LogNotificationSink)),
        Transport::Webhook => {
            let url = config
                .webhook_url
                .clone()
                .context("RESTOCK_WEBHOOK_URL must be set when RESTOCK_TRANSPORT=webhook")?;
            Ok(Arc::new(WebhookNotificationSink::new(url, config.webhook_bearer.clone())))
        }
        #[cfg(any(feature = "kafka", feature = "kafka-producer"))]
        Transport::Kafka => {
            let sink = KafkaNotificationSink::from_bootstrap(&config.kafka_bootstrap, shop_domain)
                .context("failed to create kafka producer")?;
            Ok(Arc::new(sink))
        }
        #[cfg(not(any(feature = "kafka", feature = "kafka-producer")))]
        Transport::Kafka => {
            let _ = shop_domain;
            anyhow::bail!("RESTOCK_TRANSPORT=kafka requires building with the kafka-producer feature")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturingSink;

    fn report(skus: &[&str]) -> LowStockReport {
        LowStockReport {
            skus: skus.iter().map(|s| s.to_string()).collect(),
            variants_scanned: skus.len(),
            threshold: 10.0,
        }
    }

    #[test]
    fn compose_message_joins_with_commas_and_keeps_duplicates() {
        let skus = vec!["SKU1".to_string(), "SKU2".to_string(), "SKU1".to_string()];
        assert_eq!(compose_message(&skus).as_deref(), Some("SKU1,SKU2,SKU1"));
        assert_eq!(compose_message(&[]), None);
    }

    #[tokio::test]
    async fn empty_report_never_reaches_the_sink() {
        let sink = Arc::new(CapturingSink::new());
        let dispatcher = NotificationDispatcher::new("inventory.low_stock", sink.clone());
        assert!(dispatcher.dispatch(&report(&[])).await.is_none());
        assert_eq!(sink.publish_count(), 0);
    }

    #[tokio::test]
    async fn dispatch_publishes_single_message_to_configured_topic() {
        let sink = Arc::new(CapturingSink::new());
        let dispatcher = NotificationDispatcher::new("restock.alerts", sink.clone());
        let receipt = dispatcher
            .dispatch(&report(&["A1", "B2"]))
            .await
            .expect("dispatch attempted")
            .expect("dispatch ok");
        assert!(!receipt.message_id.is_empty());
        let published = sink.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "restock.alerts");
        assert_eq!(published[0].message, "A1,B2");
    }

    #[tokio::test]
    async fn log_sink_always_acknowledges() {
        let receipt = LogNotificationSink
            .publish("inventory.low_stock", "A1")
            .await
            .expect("log sink");
        assert!(Uuid::parse_str(&receipt.message_id).is_ok());
    }

    #[test]
    fn log_transport_builds_without_network() {
        let config = NotifyConfig {
            topic: "inventory.low_stock".into(),
            transport: Transport::Log,
            kafka_bootstrap: "localhost:9092".into(),
            webhook_url: None,
            webhook_bearer: None,
        };
        assert!(build_sink(&config, "acme").is_ok());
    }

    #[test]
    fn webhook_transport_without_url_fails_to_build() {
        let config = NotifyConfig {
            topic: "inventory.low_stock".into(),
            transport: Transport::Webhook,
            kafka_bootstrap: "localhost:9092".into(),
            webhook_url: None,
            webhook_bearer: None,
        };
        assert!(build_sink(&config, "acme").is_err());
    }

    #[cfg(any(feature = "kafka", feature = "kafka-producer"))]
    #[test]
    fn kafka_transport_builds_without_contacting_broker() {
        let config = NotifyConfig {
            topic: "inventory.low_stock".into(),
            transport: Transport::Kafka,
            kafka_bootstrap: "127.0.0.1:1".into(),
            webhook_url: None,
            webhook_bearer: None,
        };
        assert!(KafkaNotificationSink::from_bootstrap("127.0.0.1:1", "acme").is_ok());
        assert!(build_sink(&config, "acme").is_ok());
    }

    #[cfg(any(feature = "kafka", feature = "kafka-producer"))]
    #[tokio::test]
    async fn kafka_publish_to_unreachable_broker_is_a_transport_error() {
        let producer: rdkafka::producer::FutureProducer = rdkafka::ClientConfig::new()
            .set("bootstrap.servers", "127.0.0.1:1")
            .set("message.timeout.ms", "500")
            .create()
            .expect("producer");
        let sink = KafkaNotificationSink::new(producer, "acme");
        match sink.publish("inventory.low_stock", "A1").await {
            Err(DispatchError::Transport(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(not(any(feature = "kafka", feature = "kafka-producer")))]
    #[test]
    fn kafka_transport_requires_the_producer_feature() {
        let config = NotifyConfig {
            topic: "inventory.low_stock".into(),
            transport: Transport::Kafka,
            kafka_bootstrap: "localhost:9092".into(),
            webhook_url: None,
            webhook_bearer: None,
        };
        let err = build_sink(&config, "acme").err().expect("kafka without feature fails");
        assert!(err.to_string().contains("kafka-producer"), "{err}");
    }
}
