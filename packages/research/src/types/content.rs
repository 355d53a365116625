//! Scraped content - the output of a single successful page fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hard cap on extracted text per page, in characters.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Minimum viable extracted text, in characters.
///
/// Pages under this threshold usually indicate a paywall, bot-block or
/// render failure rather than genuinely sparse content, and are treated
/// as failed fetches.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Clean text content fetched from one URL.
///
/// Only successful fetches exist downstream; the coordinator drops
/// failures before they reach the extraction stage. Ephemeral: held
/// in memory for the duration of one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedContent {
    /// URL the content was fetched from
    pub url: String,

    /// Extracted plain text, capped at [`MAX_CONTENT_CHARS`]
    pub content: String,

    /// Always true for values that escaped the fetcher
    pub success: bool,

    /// SHA-256 of the content, used to drop duplicate pages in a batch
    pub content_hash: String,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

impl ScrapedContent {
    /// Create a successful scrape result, capping the content.
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        let mut content = content.into();
        if content.chars().count() > MAX_CONTENT_CHARS {
            content = content.chars().take(MAX_CONTENT_CHARS).collect();
        }
        let content_hash = Self::hash_content(&content);

        Self {
            url: url.into(),
            content,
            success: true,
            content_hash,
            fetched_at: Utc::now(),
        }
    }

    /// Calculate SHA-256 hash of content.
    pub fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Content length in characters.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}
