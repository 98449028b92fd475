//! Publication channel implementations
//!
//! The channel accepts a bounded string and returns an opaque identifier for
//! the published message. It also exposes its URL-shortener width, which the
//! composer reserves up front and the announcer refreshes periodically.
//!
//! Two implementations:
//! - [`WebhookPublisher`] - JSON POST to a configured endpoint
//! - [`ConsolePublisher`] - dry-run channel that logs instead of posting

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::config::PublisherConfig;

/// Errors from the publication channel
#[derive(Error, Debug)]
pub enum PublishError {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The channel rejected the message
    #[error("Channel rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The channel's response did not decode
    #[error("Malformed channel response: {0}")]
    Malformed(String),

    /// The channel is not configured
    #[error("Invalid publisher configuration: {0}")]
    InvalidConfig(String),
}

impl PublishError {
    /// Transport failures and server-side rejections may clear up next cycle
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}

/// A channel that publishes announcement bodies
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &str;

    /// Publish a message body, returning an opaque published-message id
    async fn publish(&self, body: &str) -> Result<String, PublishError>;

    /// Current width of one shortened URL on this channel
    async fn short_url_width(&self) -> Result<usize, PublishError>;
}

#[derive(Debug, Deserialize)]
struct PublishReceipt {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ChannelConfiguration {
    short_url_length_https: usize,
}

/// Webhook-backed publication channel
pub struct WebhookPublisher {
    client: Client,
    url: String,
    auth_token: Option<String>,
}

impl WebhookPublisher {
    /// Create a publisher from the channel configuration
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidConfig` when no webhook URL is set or
    /// the URL is not http(s).
    pub fn new(config: &PublisherConfig) -> Result<Self, PublishError> {
        let url = config
            .webhook_url
            .clone()
            .ok_or_else(|| PublishError::InvalidConfig("webhook URL is not set".to_string()))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PublishError::InvalidConfig(format!(
                "webhook URL must start with http:// or https://: {url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, body: &str) -> Result<String, PublishError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "body": body }));

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable response body".to_string());
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let receipt: PublishReceipt = response
            .json()
            .await
            .map_err(|e| PublishError::Malformed(e.to_string()))?;

        Ok(receipt.id)
    }

    async fn short_url_width(&self) -> Result<usize, PublishError> {
        let url = format!("{}/configuration", self.url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body: "configuration endpoint unavailable".to_string(),
            });
        }

        let configuration: ChannelConfiguration = response
            .json()
            .await
            .map_err(|e| PublishError::Malformed(e.to_string()))?;

        Ok(configuration.short_url_length_https)
    }
}

/// Dry-run channel: logs the message instead of posting it
pub struct ConsolePublisher {
    short_url_width: usize,
    counter: AtomicU64,
}

impl ConsolePublisher {
    pub fn new(short_url_width: usize) -> Self {
        Self {
            short_url_width,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Publisher for ConsolePublisher {
    fn name(&self) -> &str {
        "console"
    }

    async fn publish(&self, body: &str) -> Result<String, PublishError> {
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            chars = body.chars().count(),
            "dry-run publish: {body}"
        );
        Ok(format!("dry-run-{sequence}"))
    }

    async fn short_url_width(&self) -> Result<usize, PublishError> {
        Ok(self.short_url_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher_config(url: Option<&str>) -> PublisherConfig {
        PublisherConfig {
            webhook_url: url.map(String::from),
            auth_token: None,
            timeout_secs: 5,
            default_short_url_width: 23,
        }
    }

    #[test]
    fn test_webhook_requires_url() {
        let result = WebhookPublisher::new(&publisher_config(None));
        assert!(matches!(result, Err(PublishError::InvalidConfig(_))));
    }

    #[test]
    fn test_webhook_rejects_bad_scheme() {
        let result = WebhookPublisher::new(&publisher_config(Some("ftp://example.com")));
        assert!(matches!(result, Err(PublishError::InvalidConfig(_))));
    }

    #[test]
    fn test_webhook_strips_trailing_slash() {
        let publisher =
            WebhookPublisher::new(&publisher_config(Some("https://example.com/announce/")))
                .unwrap();
        assert_eq!(publisher.url(), "https://example.com/announce");
    }

    #[tokio::test]
    async fn test_console_publisher_issues_sequential_ids() {
        let publisher = ConsolePublisher::new(23);
        let first = publisher.publish("hello").await.unwrap();
        let second = publisher.publish("world").await.unwrap();

        assert_eq!(first, "dry-run-1");
        assert_eq!(second, "dry-run-2");
        assert_eq!(publisher.short_url_width().await.unwrap(), 23);
    }

    #[test]
    fn test_invalid_config_is_not_recoverable() {
        assert!(!PublishError::InvalidConfig("no url".to_string()).is_recoverable());
        assert!(PublishError::Rejected {
            status: 503,
            body: String::new()
        }
        .is_recoverable());
    }
}
