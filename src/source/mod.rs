//! HTTP adapters for the ranked-list source and the metadata lookup service
//!
//! Two seams live here:
//! - [`TrendingSource`] - "fetch up to N pages of trending candidates"
//! - [`StatsSource`] - supplementary per-project statistics
//!
//! Both adapters surface upstream failures as error values and never retry:
//! retrying is the discovery engine's job, expressed as scope widening.

mod client;
mod metadata;

pub use client::TrendingClient;
pub use metadata::StatsClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Candidate, ProjectStats};

/// Errors from the ranked-list source or the metadata lookup service
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Upstream payload did not decode into the expected shape
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// The caller asked for zero pages
    #[error("Page count must be at least 1")]
    InvalidPageCount,
}

/// Interface to the ranked-list provider
#[async_trait]
pub trait TrendingSource: Send + Sync {
    /// Fetch the first `page_count` pages of trending candidates, in rank order
    ///
    /// `page_count` must be at least 1. Any upstream failure is returned as-is;
    /// the caller treats it as "no candidates available for this scope".
    async fn fetch_candidates(&self, page_count: u32) -> Result<Vec<Candidate>, SourceError>;
}

/// Interface to the metadata lookup service
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Look up supplementary statistics for a project path like "owner/repo"
    async fn project_stats(&self, path: &str) -> Result<ProjectStats, SourceError>;
}
