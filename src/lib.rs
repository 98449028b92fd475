//! trendcast - Trending Repository Announcer
//!
//! A periodic announcement bot that discovers trending projects from a
//! ranked-list API, filters out everything it has announced before, renders a
//! budget-constrained summary message and hands it to a publication channel.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`source`] - Trending-list and metadata HTTP adapters
//! - [`picker`] - Uniform without-replacement candidate sampling
//! - [`storage`] - Announcement dedup store (Redis sorted set)
//! - [`discovery`] - Scope-widening discovery state machine
//! - [`composer`] - Character-budgeted message rendering
//! - [`publisher`] - Publication channel implementations
//! - [`announcer`] - Scheduling and single-consumer dispatch loop
//!
//! # Example
//!
//! ```no_run
//! use trendcast::announcer::Announcer;
//! use trendcast::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!     let announcer = Announcer::from_config(&config, true).await?;
//!     announcer.run().await?;
//!     Ok(())
//! }
//! ```

pub mod announcer;
pub mod composer;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod picker;
pub mod publisher;
pub mod source;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::announcer::Announcer;
    pub use crate::composer::Composer;
    pub use crate::config::Config;
    pub use crate::discovery::{DiscoveryEngine, DiscoveryOutcome};
    pub use crate::error::{Error, Result};
    pub use crate::models::{Candidate, Message, ProjectStats};
    pub use crate::picker::RandomPicker;
    pub use crate::publisher::Publisher;
    pub use crate::source::{StatsSource, TrendingSource};
    pub use crate::storage::AnnouncementStore;
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use models::{Candidate, Message, ProjectStats};
