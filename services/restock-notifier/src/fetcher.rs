use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::{ShopCredentials, ShopifyConfig};
use crate::error::FetchError;

/// Source of the raw catalog document. Shape checks happen later, in `Catalog::from_value`.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Value, FetchError>;
}

/// Reads `products.json` from the Shopify Admin REST API using basic auth.
#[derive(Clone)]
pub struct ShopifyCatalogFetcher {
    client: Client,
    url: String,
    credentials: ShopCredentials,
}

impl ShopifyCatalogFetcher {
    pub fn new(config: &ShopifyConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| FetchError::Request(err.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ShopifyConfig) -> Self {
        Self {
            client,
            url: config.products_url(),
            credentials: config.credentials.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogFetcher for ShopifyCatalogFetcher {
    async fn fetch(&self) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_password))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| FetchError::Request(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Request(err.to_string()))?;
        debug!(bytes = body.len(), url = %self.url, "Fetched catalog body");
        serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}
