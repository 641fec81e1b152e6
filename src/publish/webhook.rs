//! Outbound webhook delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::WebhookConfig;
use crate::{PublisherError, Result};

/// Body of a webhook message.
#[derive(Debug, Serialize)]
pub struct WebhookMessage<'a> {
    /// Message text.
    pub content: &'a str,
}

/// Destination for message chunks.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Deliver one message to `url`.
    ///
    /// Only a failure to complete the call is an error.
    async fn deliver(&self, url: &str, content: &str) -> Result<()>;
}

/// HTTP webhook client posting `{"content": ...}` JSON bodies.
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    /// Create a new client with the configured timeout.
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PublisherError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSink for WebhookClient {
    async fn deliver(&self, url: &str, content: &str) -> Result<()> {
        let response = self
            .client
            .post(url)
            .json(&WebhookMessage { content })
            .send()
            .await
            .map_err(|e| PublisherError::Delivery(format!("webhook call failed: {}", e.without_url())))?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read webhook response body: {}", e.without_url());
                String::new()
            }
        };
        if status.is_success() {
            debug!("{} - {}", status, body);
        } else {
            warn!("Webhook responded with {} - {}", status, body);
        }
        Ok(())
    }
}
