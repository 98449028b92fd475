//! Announcement dedup store
//!
//! The store is the single shared source of truth for "already announced".
//! It is a Redis sorted set: members are project names, scores are the
//! `YYYYMMDDHHMMSS` announcement timestamps, so the set doubles as a
//! chronological announcement log.
//!
//! Every operation acquires a pooled connection, runs one command and
//! releases the connection; concurrent discovery attempts can query freely.
//! Lookup errors must never be read as "not announced" - callers skip the
//! candidate instead (fail-closed).

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::StorageConfig;

/// Errors from the announcement store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection pool construction or acquisition failed
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// A Redis command failed
    #[error("Redis command failed: {0}")]
    Redis(#[from] redis::RedisError),

    /// The configured storage URL did not parse
    #[error("Invalid storage URL: {0}")]
    InvalidUrl(String),
}

impl StoreError {
    /// Pool and command failures are usually transient
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }
}

/// Persistent record of previously announced project names
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// Check whether a project name has already been announced
    ///
    /// An `Err` means the store could not answer; it does NOT mean "no".
    async fn is_announced(&self, name: &str) -> Result<bool, StoreError>;

    /// Record an announcement under the given timestamp score
    ///
    /// Idempotent from the caller's perspective: re-recording a name
    /// overwrites the score and still counts as success.
    async fn record_announcement(&self, name: &str, score: &str) -> Result<bool, StoreError>;
}

/// Redis-backed announcement store
pub struct RedisStore {
    /// Connection pool
    pool: Pool,

    /// Sorted-set key holding announced project names
    key: String,
}

impl RedisStore {
    /// Connect to Redis and verify the connection with a PING
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let url = config
            .connection_url()
            .map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

        let pool_config = PoolConfig::from_url(&url);
        let pool = pool_config
            .builder()
            .map_err(|e| StoreError::Pool(format!("Failed to create pool builder: {e}")))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| StoreError::Pool(format!("Failed to create connection pool: {e}")))?;

        // Test connection
        let mut conn = pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;
        let _: String = redis::cmd("PING").query_async(&mut *conn).await?;

        tracing::info!(url = %config.url, key = %config.set_key, "Connected to announcement store");

        Ok(Self {
            pool,
            key: config.set_key.clone(),
        })
    }
}

#[async_trait]
impl AnnouncementStore for RedisStore {
    async fn is_announced(&self, name: &str) -> Result<bool, StoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        let score: Option<f64> = conn.zscore(&self.key, name).await?;
        Ok(score.is_some())
    }

    async fn record_announcement(&self, name: &str, score: &str) -> Result<bool, StoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        // ZADD returns the number of newly added members; 0 means the name
        // existed and only its score moved, which is still a success here.
        let _added: i64 = conn.zadd(&self.key, name, score).await?;
        Ok(true)
    }
}

/// In-memory announcement store for tests and offline previews
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store with announced names
    pub async fn seed<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = self.entries.write().await;
        for name in names {
            entries.insert(name.into(), String::from("00000000000000"));
        }
    }

    /// Number of recorded announcements
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing has been recorded
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Score recorded for a name, if any
    pub async fn score_of(&self, name: &str) -> Option<String> {
        self.entries.read().await.get(name).cloned()
    }
}

#[async_trait]
impl AnnouncementStore for MemoryStore {
    async fn is_announced(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().await.contains_key(name))
    }

    async fn record_announcement(&self, name: &str, score: &str) -> Result<bool, StoreError> {
        self.entries
            .write()
            .await
            .insert(name.to_string(), score.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_memory_store_round_trip() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            assert!(!store.is_announced("rust-lang/cargo").await.unwrap());

            store
                .record_announcement("rust-lang/cargo", "20150802073005")
                .await
                .unwrap();

            assert!(store.is_announced("rust-lang/cargo").await.unwrap());
            assert_eq!(
                store.score_of("rust-lang/cargo").await,
                Some("20150802073005".to_string())
            );
        });
    }

    #[test]
    fn test_memory_store_overwrite_is_success() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            assert!(store
                .record_announcement("a/b", "20150802073005")
                .await
                .unwrap());
            assert!(store
                .record_announcement("a/b", "20160101000000")
                .await
                .unwrap());

            assert_eq!(store.len().await, 1);
            assert_eq!(store.score_of("a/b").await, Some("20160101000000".to_string()));
        });
    }

    #[test]
    fn test_memory_store_seed() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store.seed(["a/b", "c/d"]).await;

            assert!(store.is_announced("a/b").await.unwrap());
            assert!(store.is_announced("c/d").await.unwrap());
            assert!(!store.is_announced("e/f").await.unwrap());
        });
    }

    #[test]
    fn test_invalid_url_is_not_recoverable() {
        let err = StoreError::InvalidUrl("not-a-url".to_string());
        assert!(!err.is_recoverable());

        let err = StoreError::Pool("timed out".to_string());
        assert!(err.is_recoverable());
    }

    // Integration tests require running Redis
    #[tokio::test]
    #[ignore = "Requires running Redis"]
    async fn test_redis_store_connection() {
        let config = Config::default();
        let store = RedisStore::connect(&config.storage).await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis"]
    async fn test_redis_store_round_trip() {
        let mut config = Config::default();
        config.storage.set_key = String::from("announced-projects-test");

        let store = RedisStore::connect(&config.storage).await.unwrap();
        store
            .record_announcement("trendcast/self-test", "20150802073005")
            .await
            .unwrap();

        assert!(store.is_announced("trendcast/self-test").await.unwrap());
    }
}
