//! Scope-widening discovery engine
//!
//! One discovery attempt walks an escalating number of ranked-list pages
//! looking for a candidate that has not been announced yet. Each scope is
//! scanned in uniformly random order via a fresh [`RandomPicker`]; candidates
//! that are already announced - or whose dedup status cannot be determined -
//! are skipped. A scope that yields nothing widens by one page until the
//! ceiling, after which the attempt ends with [`DiscoveryOutcome::Exhausted`].
//!
//! Exhaustion is an expected, recoverable outcome: it just means no trending
//! candidate survived dedup filtering this cycle.

use std::sync::Arc;

use crate::models::Candidate;
use crate::picker::{PickerError, RandomPicker};
use crate::source::TrendingSource;
use crate::storage::AnnouncementStore;

/// Terminal result of one discovery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// An unannounced candidate was found
    Found(Candidate),
    /// Every reachable candidate was filtered out
    Exhausted,
}

impl DiscoveryOutcome {
    /// Unwrap into an optional candidate
    pub fn into_candidate(self) -> Option<Candidate> {
        match self {
            Self::Found(candidate) => Some(candidate),
            Self::Exhausted => None,
        }
    }
}

/// Internal scan state; `Scanning` carries the current page scope
enum ScanState {
    Scanning(u32),
    Found(Candidate),
    Exhausted,
}

/// Drives the picker across widening page scopes until a fresh candidate
/// turns up or the scope ceiling is hit
pub struct DiscoveryEngine {
    source: Arc<dyn TrendingSource>,
    store: Arc<dyn AnnouncementStore>,
    max_scope: u32,
}

impl DiscoveryEngine {
    pub fn new(
        source: Arc<dyn TrendingSource>,
        store: Arc<dyn AnnouncementStore>,
        max_scope: u32,
    ) -> Self {
        Self {
            source,
            store,
            max_scope: max_scope.max(1),
        }
    }

    /// Run one discovery attempt to completion
    pub async fn discover(&self) -> DiscoveryOutcome {
        let mut state = ScanState::Scanning(1);

        loop {
            match state {
                ScanState::Scanning(scope) => {
                    tracing::debug!(scope, "scanning ranked list for a fresh candidate");
                    state = self.scan_scope(scope).await;
                }
                ScanState::Found(candidate) => {
                    tracing::info!(project = %candidate.name, "found unannounced candidate");
                    return DiscoveryOutcome::Found(candidate);
                }
                ScanState::Exhausted => {
                    tracing::info!(
                        max_scope = self.max_scope,
                        "no unannounced candidate in any scope"
                    );
                    return DiscoveryOutcome::Exhausted;
                }
            }
        }
    }

    /// Scan a single scope; decides the next state
    async fn scan_scope(&self, scope: u32) -> ScanState {
        let candidates = match self.source.fetch_candidates(scope).await {
            Ok(candidates) => candidates,
            Err(e) => {
                // No candidates for this scope; the widening loop moves on
                tracing::warn!(scope, error = %e, "candidate fetch failed");
                Vec::new()
            }
        };

        let mut picker = RandomPicker::new(candidates);

        loop {
            let candidate = match picker.draw() {
                Ok(candidate) => candidate,
                Err(PickerError::Exhausted) => break,
            };

            match self.store.is_announced(&candidate.name).await {
                Err(e) => {
                    // Unknown dedup status: never announce, skip the candidate
                    tracing::warn!(
                        project = %candidate.name,
                        error = %e,
                        "dedup lookup failed, skipping candidate"
                    );
                    continue;
                }
                Ok(true) => {
                    tracing::debug!(project = %candidate.name, "already announced, skipping");
                    continue;
                }
                Ok(false) => return ScanState::Found(candidate),
            }
        }

        if scope < self.max_scope {
            ScanState::Scanning(scope + 1)
        } else {
            ScanState::Exhausted
        }
    }
}
