//! Excerpt search over plain document text
//!
//! The first occurrence of an excerpt always wins, even when it recurs later
//! in the document. Clause excerpts are expected to be near-unique within a
//! contract.

use serde::{Deserialize, Serialize};
use shared_types::MatchMethod;
use tracing::debug;

use crate::error::{EngineError, Result};

pub const DEFAULT_FALLBACK_PREFIX_CHARS: usize = 100;

/// Characters of surrounding text shown in operator context snippets
pub const CONTEXT_RADIUS: usize = 20;

/// Position of a located excerpt, in chars of plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocateResult {
    pub offset: usize,
    pub length: usize,
    pub method: MatchMethod,
    /// The text that was actually found (the prefix for fallback matches)
    pub matched_text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ExcerptLocator {
    fallback_prefix_chars: usize,
}

impl Default for ExcerptLocator {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_PREFIX_CHARS)
    }
}

impl ExcerptLocator {
    pub fn new(fallback_prefix_chars: usize) -> Self {
        Self {
            fallback_prefix_chars,
        }
    }

    /// Find `excerpt` in `plain_text`.
    ///
    /// Tries the whole excerpt first, then its first `fallback_prefix_chars`
    /// characters when the excerpt is longer than that.
    pub fn locate(&self, plain_text: &str, excerpt: &str) -> Result<LocateResult> {
        let mut attempts = Vec::new();

        if excerpt.trim().is_empty() {
            return Err(EngineError::ExcerptNotFound {
                excerpt: excerpt.to_string(),
                attempts,
            });
        }

        let excerpt_chars = excerpt.chars().count();
        attempts.push(format!("exact ({} chars)", excerpt_chars));
        if let Some(offset) = find_char_offset(plain_text, excerpt) {
            debug!(offset, length = excerpt_chars, "exact match");
            return Ok(LocateResult {
                offset,
                length: excerpt_chars,
                method: MatchMethod::Exact,
                matched_text: excerpt.to_string(),
            });
        }

        if excerpt_chars > self.fallback_prefix_chars && self.fallback_prefix_chars > 0 {
            let prefix: String = excerpt.chars().take(self.fallback_prefix_chars).collect();
            attempts.push(format!("prefix ({} chars)", self.fallback_prefix_chars));
            if let Some(offset) = find_char_offset(plain_text, &prefix) {
                debug!(
                    offset,
                    length = self.fallback_prefix_chars,
                    "matched on excerpt prefix"
                );
                return Ok(LocateResult {
                    offset,
                    length: self.fallback_prefix_chars,
                    method: MatchMethod::FallbackSubstring,
                    matched_text: prefix,
                });
            }
        }

        debug!(attempts = attempts.len(), "excerpt not found");
        Err(EngineError::ExcerptNotFound {
            excerpt: excerpt.to_string(),
            attempts,
        })
    }
}

/// Char offset of the first occurrence of `needle`
fn find_char_offset(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count())
}

/// Surrounding text for a located excerpt, for logs and skip reports
pub fn context(plain_text: &str, located: &LocateResult, radius: usize) -> String {
    let start = located.offset.saturating_sub(radius);
    let take = located.offset - start + located.length + radius;
    let snippet: String = plain_text.chars().skip(start).take(take).collect();
    format!("...{}...", snippet)
}
