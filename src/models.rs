// Core data structures for the trendcast announcer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trending project eligible for announcement
///
/// Candidates are rebuilt on every discovery attempt from the ranked-list
/// source and never persisted; only the name of an announced project survives
/// a cycle (in the dedup store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Candidate {
    /// Full project path, e.g. "rust-lang/cargo". Unique within one scope.
    pub name: String,
    /// Owning namespace, e.g. "rust-lang"
    pub owner: String,
    /// Bare repository name, e.g. "cargo"
    pub repository_name: String,
    /// Project description; empty when the project has none
    #[serde(default)]
    pub description: String,
    /// Star count as reported by the ranked list
    #[serde(default)]
    pub star_count: u64,
    /// Canonical project URL
    pub url: Option<String>,
}

impl Candidate {
    pub fn new(owner: impl Into<String>, repository_name: impl Into<String>) -> Self {
        let owner = owner.into();
        let repository_name = repository_name.into();
        Self {
            name: format!("{owner}/{repository_name}"),
            owner,
            repository_name,
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the star count
    pub fn with_stars(mut self, star_count: u64) -> Self {
        self.star_count = star_count;
        self
    }

    /// Set the project URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Supplementary project statistics from the metadata lookup service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectStats {
    pub star_count: u64,
}

/// A composed announcement on its way to the publication channel
///
/// An empty `subject_name` is the sentinel for "no message produced this
/// cycle"; the dispatch loop discards those instead of publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Rendered message body, at most the configured character budget
    pub body: String,
    /// Name of the candidate the body was built from
    pub subject_name: String,
}

impl Message {
    pub fn new(body: impl Into<String>, subject_name: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            subject_name: subject_name.into(),
        }
    }

    /// The "nothing to announce" sentinel
    pub fn none() -> Self {
        Self {
            body: String::new(),
            subject_name: String::new(),
        }
    }

    /// True when this message carries an actual announcement
    pub fn has_subject(&self) -> bool {
        !self.subject_name.is_empty()
    }

    /// Body length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.body.chars().count()
    }
}

/// Format a timestamp as the lexically-sortable announcement score
///
/// The score doubles as the sorted-set ordering value in the dedup store,
/// so it must stay fixed-width and digits-only.
pub fn announcement_score(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Announcement score for the current instant
pub fn current_announcement_score() -> String {
    announcement_score(Utc::now())
}
