//! Character-budgeted message rendering
//!
//! Turns a candidate (plus optional metadata enrichment) into an
//! announcement body that never exceeds the configured character budget.
//! Segments are appended in priority order - project name, description,
//! star count, URL - and each one is included only if it still fits.
//!
//! The width of one shortened URL (plus a separating space) is reserved up
//! front, so the URL itself is appended at the end without re-checking the
//! budget. That width comes from the publication channel's configuration and
//! is refreshed at runtime, hence the shared atomic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::models::{Candidate, Message, ProjectStats};

/// Minimum leftover budget before a description is worth rendering.
/// Accounts for the ": " prefix, a star count and a few useful words.
const DESCRIPTION_THRESHOLD: i64 = 22;

/// Budget-constrained announcement renderer
pub struct Composer {
    /// Hard character budget for one message
    char_budget: usize,

    /// Reserved width of one shortened URL, refreshed from the channel
    short_url_width: Arc<AtomicUsize>,
}

impl Composer {
    /// Create a composer sharing a refreshable short-URL width
    pub fn new(char_budget: usize, short_url_width: Arc<AtomicUsize>) -> Self {
        Self {
            char_budget,
            short_url_width,
        }
    }

    /// Create a composer with a fixed short-URL width (tests, previews)
    pub fn with_fixed_width(char_budget: usize, short_url_width: usize) -> Self {
        Self::new(char_budget, Arc::new(AtomicUsize::new(short_url_width)))
    }

    /// Handle to the shared short-URL width for the refresh task
    pub fn short_url_width_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.short_url_width)
    }

    /// Render a candidate into an announcement message
    ///
    /// Deterministic given its inputs; `stats`, when present, overrides the
    /// candidate's own star count. A missing enrichment never fails the
    /// message - the snapshot count is used instead.
    pub fn compose(&self, candidate: &Candidate, stats: Option<&ProjectStats>) -> Message {
        let mut body = String::new();

        let url_width = self.short_url_width.load(Ordering::Relaxed) as i64;
        // Reserve the shortened URL plus one separating space up front
        let mut budget = self.char_budget as i64 - (url_width + 1);

        // Owners like docker/docker or flarum/flarum double the same word;
        // collapse to the bare repository name.
        let used_name = if candidate.owner == candidate.repository_name {
            candidate.repository_name.as_str()
        } else {
            candidate.name.as_str()
        };

        let name_width = char_count(used_name);
        if name_width < budget {
            budget -= name_width;
            body.push_str(used_name);
        }

        let stars = stats
            .map(|s| s.star_count)
            .unwrap_or(candidate.star_count)
            .to_string();
        let star_width = char_count(&stars);

        if budget > DESCRIPTION_THRESHOLD && !candidate.description.is_empty() {
            let after_prefix = budget - 2;
            let rendered = if char_count(&candidate.description) < after_prefix - star_width {
                Some(candidate.description.clone())
            } else {
                let target = after_prefix - 4 - star_width;
                // A zero target would make crop a no-op and blow the budget
                (target != 0).then(|| crop(&candidate.description, target, "...", true))
            };

            if let Some(description) = rendered {
                body.push_str(": ");
                body.push_str(&description);
                budget = after_prefix - char_count(&description);
            }
        }

        if budget >= star_width + 2 {
            body.push_str(" \u{2605}");
            body.push_str(&stars);
            budget -= star_width + 2;
        }

        // The URL's width was reserved at the start, no further deduction
        if let Some(url) = &candidate.url {
            body.push(' ');
            body.push_str(url);
        }

        Message::new(body, candidate.name.clone())
    }
}

/// Limit a string to a number of characters, marking the cut with a suffix
///
/// `max_chars == 0` is a no-op sentinel. A positive `max_chars` keeps the
/// first `max_chars - 1` characters and appends `suffix`; a negative value
/// mirrors the operation from the tail of the string and prepends `suffix`
/// instead. Strings already shorter than the limit pass through unchanged.
///
/// With `snap_to_word`, a forward crop backs up to the last space before the
/// cut (dropping the partial word) and a backward crop advances past the
/// first space after it.
///
/// Operates on characters, never bytes, so multibyte text cannot be split.
pub fn crop(content: &str, max_chars: i64, suffix: &str, snap_to_word: bool) -> String {
    if max_chars == 0 {
        return content.to_string();
    }

    let glyphs: Vec<char> = content.chars().collect();
    let len = glyphs.len() as i64;
    if len < max_chars.abs() {
        return content.to_string();
    }

    if max_chars < 0 {
        let mut cropped: String = glyphs[(len + max_chars) as usize..].iter().collect();
        if snap_to_word {
            if let Some(pos) = cropped.find(' ') {
                cropped = cropped[pos + 1..].to_string();
            }
        }
        format!("{suffix}{cropped}")
    } else {
        let mut cropped: String = glyphs[..(max_chars - 1) as usize].iter().collect();
        if snap_to_word {
            if let Some(pos) = cropped.rfind(' ') {
                cropped.truncate(pos);
            }
        }
        cropped.push_str(suffix);
        cropped
    }
}

fn char_count(s: &str) -> i64 {
    s.chars().count() as i64
}
