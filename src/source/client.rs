//! Ranked-list HTTP client
//!
//! Fetches pages of trending projects from a GitLab-style projects API and
//! maps them into [`Candidate`] records. Requests are paced with a rate
//! limiter; failures surface immediately and are never retried here.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

use super::{SourceError, TrendingSource};
use crate::config::SourceConfig;
use crate::models::Candidate;

/// One project record as returned by the ranked-list API
#[derive(Debug, Deserialize)]
struct ProjectRecord {
    #[serde(default)]
    path_with_namespace: String,

    #[serde(default)]
    path: String,

    #[serde(default)]
    namespace: Namespace,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    star_count: u64,

    #[serde(default)]
    web_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Namespace {
    #[serde(default)]
    path: String,
}

impl From<ProjectRecord> for Candidate {
    fn from(record: ProjectRecord) -> Self {
        Candidate {
            name: record.path_with_namespace,
            owner: record.namespace.path,
            repository_name: record.path,
            description: record.description.unwrap_or_default(),
            star_count: record.star_count,
            url: record.web_url,
        }
    }
}

/// HTTP client for the ranked-list API
pub struct TrendingClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency against the shared API
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// API base URL; overridable to point tests at a mock server
    base_url: String,

    /// Projects per requested page
    per_page: u32,
}

impl TrendingClient {
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

        let rate = NonZeroU32::new(config.requests_per_second)
            .unwrap_or_else(|| NonZeroU32::new(1).unwrap());
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page,
        })
    }

    /// Fetch a single page of the ranked list
    async fn fetch_page(&self, page: u32) -> Result<Vec<Candidate>, SourceError> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}/api/v4/projects?order_by=star_count&sort=desc&per_page={}&page={}",
            self.base_url, self.per_page, page
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::ServerError(status.as_u16()));
        }

        let records: Vec<ProjectRecord> = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        tracing::debug!(page, count = records.len(), "fetched ranked-list page");

        Ok(records.into_iter().map(Candidate::from).collect())
    }
}

#[async_trait]
impl TrendingSource for TrendingClient {
    async fn fetch_candidates(&self, page_count: u32) -> Result<Vec<Candidate>, SourceError> {
        if page_count == 0 {
            return Err(SourceError::InvalidPageCount);
        }

        let mut candidates = Vec::new();
        for page in 1..=page_count {
            candidates.extend(self.fetch_page(page).await?);
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_maps_to_candidate() {
        let record = ProjectRecord {
            path_with_namespace: "rust-lang/cargo".to_string(),
            path: "cargo".to_string(),
            namespace: Namespace {
                path: "rust-lang".to_string(),
            },
            description: Some("The Rust package manager".to_string()),
            star_count: 12000,
            web_url: Some("https://gitlab.com/rust-lang/cargo".to_string()),
        };

        let candidate = Candidate::from(record);
        assert_eq!(candidate.name, "rust-lang/cargo");
        assert_eq!(candidate.owner, "rust-lang");
        assert_eq!(candidate.repository_name, "cargo");
        assert_eq!(candidate.star_count, 12000);
    }

    #[test]
    fn test_missing_description_becomes_empty() {
        let record = ProjectRecord {
            path_with_namespace: "a/b".to_string(),
            path: "b".to_string(),
            namespace: Namespace {
                path: "a".to_string(),
            },
            description: None,
            star_count: 0,
            web_url: None,
        };

        let candidate = Candidate::from(record);
        assert!(candidate.description.is_empty());
        assert!(candidate.url.is_none());
    }

    #[test]
    fn test_client_creation_strips_trailing_slash() {
        let config = SourceConfig {
            base_url: "https://gitlab.com/".to_string(),
            per_page: 25,
            requests_per_second: 2,
            request_timeout_secs: 10,
        };

        let client = TrendingClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://gitlab.com");
    }

    #[tokio::test]
    async fn test_zero_pages_rejected() {
        let config = SourceConfig {
            base_url: "http://localhost:1".to_string(),
            per_page: 25,
            requests_per_second: 100,
            request_timeout_secs: 1,
        };

        let client = TrendingClient::new(&config).unwrap();
        let result = client.fetch_candidates(0).await;
        assert!(matches!(result, Err(SourceError::InvalidPageCount)));
    }
}
