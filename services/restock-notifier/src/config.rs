use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::{DEFAULT_THRESHOLD, DEFAULT_TOPIC};

pub const DEFAULT_API_VERSION: &str = "2022-04";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const MIN_SCHEDULE_SECS: u64 = 60;

#[derive(Clone)]
pub struct ShopCredentials {
    pub api_key: String,
    pub api_password: String,
    pub shop_domain: String,
}

impl fmt::Debug for ShopCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopCredentials")
            .field("api_key", &self.api_key)
            .field("api_password", &"<redacted>")
            .field("shop_domain", &self.shop_domain)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub credentials: ShopCredentials,
    pub api_version: String,
    /// Overrides the `https://<shop>.myshopify.com` origin (proxies, tests).
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl ShopifyConfig {
    pub fn products_url(&self) -> String {
        let base = match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let domain = &self.credentials.shop_domain;
                if domain.contains('.') {
                    format!("https://{domain}")
                } else {
                    format!("https://{domain}.myshopify.com")
                }
            }
        };
        format!("{base}/admin/api/{}/products.json", self.api_version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Write the notification to the service log only.
    Log,
    Webhook,
    Kafka,
}

impl FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" | "" => Ok(Transport::Log),
            "webhook" => Ok(Transport::Webhook),
            "kafka" => Ok(Transport::Kafka),
            other => Err(anyhow!("unknown RESTOCK_TRANSPORT '{other}' (expected log, webhook or kafka)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub topic: String,
    pub transport: Transport,
    pub kafka_bootstrap: String,
    pub webhook_url: Option<String>,
    pub webhook_bearer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestockConfig {
    pub shopify: ShopifyConfig,
    pub threshold: f64,
    pub notify: NotifyConfig,
    /// `None` runs a single invocation and exits.
    pub schedule: Option<Duration>,
    pub listen_addr: SocketAddr,
}

impl RestockConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };

        let credentials = ShopCredentials {
            api_key: required("SHOPIFY_API_KEY")?,
            api_password: required("SHOPIFY_API_PASSWORD")?,
            shop_domain: required("SHOPIFY_SHOP_DOMAIN")?,
        };
        let api_version = lookup("SHOPIFY_API_VERSION")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let base_url = lookup("SHOPIFY_API_BASE_URL").filter(|value| !value.trim().is_empty());
        let timeout_secs = lookup("SHOPIFY_HTTP_TIMEOUT_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let threshold = lookup("RESTOCK_THRESHOLD")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_THRESHOLD);

        let topic = lookup("RESTOCK_TOPIC")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let transport = match lookup("RESTOCK_TRANSPORT") {
            Some(value) => value.parse::<Transport>()?,
            None => Transport::Log,
        };
        let kafka_bootstrap =
            lookup("KAFKA_BOOTSTRAP").unwrap_or_else(|| "localhost:9092".to_string());
        let webhook_url = lookup("RESTOCK_WEBHOOK_URL").filter(|value| !value.trim().is_empty());
        let webhook_bearer =
            lookup("RESTOCK_WEBHOOK_BEARER").filter(|value| !value.trim().is_empty());
        if transport == Transport::Webhook && webhook_url.is_none() {
            bail!("RESTOCK_WEBHOOK_URL must be set when RESTOCK_TRANSPORT=webhook");
        }

        let schedule = lookup("RESTOCK_SCHEDULE_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.max(MIN_SCHEDULE_SECS)));

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(8095);
        let ip: IpAddr = host
            .parse()
            .with_context(|| format!("HOST '{host}' is not an IP address"))?;

        Ok(Self {
            shopify: ShopifyConfig {
                credentials,
                api_version,
                base_url,
                timeout: Duration::from_secs(timeout_secs.max(1)),
            },
            threshold,
            notify: NotifyConfig {
                topic,
                transport,
                kafka_bootstrap,
                webhook_url,
                webhook_bearer,
            },
            schedule,
            listen_addr: SocketAddr::from((ip, port)),
        })
    }
}
