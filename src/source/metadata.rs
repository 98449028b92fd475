//! Metadata lookup client
//!
//! Retrieves supplementary statistics (currently the star count) for a single
//! project. Lookup failures are expected and tolerated: the composer renders
//! without the enrichment when this service is unreachable.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{SourceError, StatsSource};
use crate::config::SourceConfig;
use crate::models::ProjectStats;

#[derive(Debug, Deserialize)]
struct ProjectDetails {
    #[serde(default)]
    star_count: u64,
}

/// HTTP client for the per-project details endpoint
pub struct StatsClient {
    client: Client,
    base_url: String,
}

impl StatsClient {
    /// Create a new client from the source configuration
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Http` if the HTTP client cannot be created
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Self::with_base_url(&config.base_url, config)
    }

    /// Create a client against a custom base URL (used by tests)
    pub fn with_base_url(base_url: &str, config: &SourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Percent-encode a project path so "owner/repo" fits into one URL segment
    fn encode_path(path: &str) -> String {
        url::form_urlencoded::byte_serialize(path.as_bytes()).collect()
    }
}

#[async_trait]
impl StatsSource for StatsClient {
    async fn project_stats(&self, path: &str) -> Result<ProjectStats, SourceError> {
        let url = format!(
            "{}/api/v4/projects/{}",
            self.base_url,
            Self::encode_path(path)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::ServerError(status.as_u16()));
        }

        let details: ProjectDetails = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        Ok(ProjectStats {
            star_count: details.star_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_escapes_separator() {
        assert_eq!(StatsClient::encode_path("rust-lang/cargo"), "rust-lang%2Fcargo");
    }

    #[test]
    fn test_encode_path_plain_segment() {
        assert_eq!(StatsClient::encode_path("cargo"), "cargo");
    }
}
