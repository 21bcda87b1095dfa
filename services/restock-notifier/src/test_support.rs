//! In-memory collaborators for exercising an invocation without a shop or a broker.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::dispatcher::{DispatchReceipt, NotificationSink};
use crate::error::{DispatchError, FetchError};
use crate::fetcher::CatalogFetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedNotification {
    pub topic: String,
    pub message: String,
}

/// Records every publish. A failing sink still records the attempt before erroring.
#[derive(Debug, Default)]
pub struct CapturingSink {
    published: Mutex<Vec<CapturedNotification>>,
    fail_with: Option<String>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    pub fn published(&self) -> Vec<CapturedNotification> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published().len()
    }
}

#[async_trait]
impl NotificationSink for CapturingSink {
    async fn publish(&self, topic: &str, message: &str) -> Result<DispatchReceipt, DispatchError> {
        let sequence = {
            let mut published = self
                .published
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            published.push(CapturedNotification {
                topic: topic.to_string(),
                message: message.to_string(),
            });
            published.len()
        };
        match &self.fail_with {
            Some(reason) => Err(DispatchError::Transport(reason.clone())),
            None => Ok(DispatchReceipt {
                message_id: format!("captured-{sequence}"),
            }),
        }
    }
}

/// Serves a fixed catalog document, or a fixed network failure.
#[derive(Debug)]
pub struct StaticCatalogFetcher {
    response: Result<Value, String>,
    calls: AtomicUsize,
}

impl StaticCatalogFetcher {
    pub fn document(document: Value) -> Self {
        Self {
            response: Ok(document),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            response: Err(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogFetcher for StaticCatalogFetcher {
    async fn fetch(&self) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(FetchError::Request)
    }
}
