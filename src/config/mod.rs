//! Configuration management for the trendcast announcer
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Trending-list source configuration
    pub source: SourceConfig,

    /// Announcement store configuration
    pub storage: StorageConfig,

    /// Publication channel configuration
    pub publisher: PublisherConfig,

    /// Message composer configuration
    pub composer: ComposerConfig,

    /// Scheduling configuration
    pub scheduler: SchedulerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trending-list source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the ranked-list API
    pub base_url: String,

    /// Projects per page when fetching the ranked list
    pub per_page: u32,

    /// Rate limit against the source (requests per second)
    pub requests_per_second: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Announcement store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Redis URL (e.g. redis://localhost:6379)
    pub url: String,

    /// Optional credential, applied to the URL when set
    pub password: Option<String>,

    /// Connection pool size
    pub pool_size: usize,

    /// Sorted-set key holding announced project names
    pub set_key: String,
}

impl StorageConfig {
    /// Effective connection URL with the optional credential applied
    pub fn connection_url(&self) -> Result<String> {
        match &self.password {
            None => Ok(self.url.clone()),
            Some(password) => {
                let mut parsed = url::Url::parse(&self.url)
                    .with_context(|| format!("Invalid storage URL: {}", self.url))?;
                parsed
                    .set_password(Some(password))
                    .map_err(|()| anyhow::anyhow!("Storage URL cannot carry a credential"))?;
                Ok(parsed.to_string())
            }
        }
    }
}

/// Publication channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Webhook endpoint receiving announcements; unset means dry-run only
    pub webhook_url: Option<String>,

    /// Optional bearer token for the webhook endpoint
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Reserved width of one shortened URL until the channel reports its own
    pub default_short_url_width: usize,
}

/// Message composer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Hard character budget for a composed message
    pub char_budget: usize,
}

/// Scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between discovery attempts
    pub poll_interval_secs: u64,

    /// Seconds between publication-channel configuration refreshes
    pub config_refresh_secs: u64,

    /// Widening ceiling for the discovery scope (pages)
    pub max_scope: u32,
}

impl SchedulerConfig {
    /// Get the poll interval as a Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get the configuration refresh interval as a Duration
    #[must_use]
    pub fn config_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.config_refresh_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("TRENDCAST_SOURCE_URL")
            .unwrap_or_else(|_| String::from("https://gitlab.com"));

        let per_page = std::env::var("TRENDCAST_SOURCE_PER_PAGE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(25);

        let requests_per_second = std::env::var("TRENDCAST_SOURCE_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(2);

        let request_timeout_secs = std::env::var("TRENDCAST_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let storage_url = std::env::var("TRENDCAST_STORAGE_URL")
            .or_else(|_| std::env::var("REDIS_URL"))
            .unwrap_or_else(|_| String::from("redis://localhost:6379"));

        let storage_password = std::env::var("TRENDCAST_STORAGE_AUTH").ok();

        let pool_size = std::env::var("TRENDCAST_STORAGE_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let set_key = std::env::var("TRENDCAST_STORAGE_SET_KEY")
            .unwrap_or_else(|_| String::from("announced-projects"));

        let webhook_url = std::env::var("TRENDCAST_WEBHOOK_URL").ok();
        let auth_token = std::env::var("TRENDCAST_WEBHOOK_TOKEN").ok();

        let publish_timeout_secs = std::env::var("TRENDCAST_WEBHOOK_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let default_short_url_width = std::env::var("TRENDCAST_SHORT_URL_WIDTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(23);

        let char_budget = std::env::var("TRENDCAST_CHAR_BUDGET")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(140);

        let poll_interval_secs = std::env::var("TRENDCAST_POLL_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3600);

        let config_refresh_secs = std::env::var("TRENDCAST_CONF_REFRESH_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86400);

        let max_scope = std::env::var("TRENDCAST_MAX_SCOPE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let log_level =
            std::env::var("TRENDCAST_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("TRENDCAST_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            source: SourceConfig {
                base_url,
                per_page,
                requests_per_second,
                request_timeout_secs,
            },
            storage: StorageConfig {
                url: storage_url,
                password: storage_password,
                pool_size,
                set_key,
            },
            publisher: PublisherConfig {
                webhook_url,
                auth_token,
                timeout_secs: publish_timeout_secs,
                default_short_url_width,
            },
            composer: ComposerConfig { char_budget },
            scheduler: SchedulerConfig {
                poll_interval_secs,
                config_refresh_secs,
                max_scope,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source.per_page == 0 {
            anyhow::bail!("per_page must be greater than 0");
        }

        if self.source.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.storage.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        if self.storage.set_key.is_empty() {
            anyhow::bail!("set_key must not be empty");
        }

        if self.scheduler.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than 0");
        }

        if self.scheduler.max_scope == 0 {
            anyhow::bail!("max_scope must be at least 1");
        }

        // A budget that cannot even hold the reserved URL leaves nothing to render
        if self.composer.char_budget <= self.publisher.default_short_url_width + 1 {
            anyhow::bail!("char_budget must exceed the reserved short URL width");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                base_url: String::from("https://gitlab.com"),
                per_page: 25,
                requests_per_second: 2,
                request_timeout_secs: 10,
            },
            storage: StorageConfig {
                url: String::from("redis://localhost:6379"),
                password: None,
                pool_size: 10,
                set_key: String::from("announced-projects"),
            },
            publisher: PublisherConfig {
                webhook_url: None,
                auth_token: None,
                timeout_secs: 10,
                default_short_url_width: 23,
            },
            composer: ComposerConfig { char_budget: 140 },
            scheduler: SchedulerConfig {
                poll_interval_secs: 3600,
                config_refresh_secs: 86400,
                max_scope: 5,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_scope() {
        let mut config = Config::default();
        config.scheduler.max_scope = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_char_budget_must_exceed_url_reservation() {
        let mut config = Config::default();
        config.composer.char_budget = 24;
        config.publisher.default_short_url_width = 23;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_accessors() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.scheduler.poll_interval(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            config.scheduler.config_refresh_interval(),
            Duration::from_secs(86400)
        );
    }

    #[test]
    fn test_connection_url_without_password() {
        let config = Config::default();
        assert_eq!(
            config.storage.connection_url().unwrap(),
            "redis://localhost:6379"
        );
    }

    #[test]
    fn test_connection_url_with_password() {
        let mut config = Config::default();
        config.storage.password = Some(String::from("hunter2"));
        let url = config.storage.connection_url().unwrap();
        assert!(url.contains("hunter2"));
        assert!(url.starts_with("redis://"));
    }
}
