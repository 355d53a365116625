//! Content acquisition - rendered page fetching under a concurrency cap.

pub mod batch;
pub mod browser;
pub mod extract;
pub mod rate_limited;

use async_trait::async_trait;

use crate::types::content::ScrapedContent;

pub use batch::BatchFetchCoordinator;
pub use browser::BrowserFetcher;
pub use rate_limited::{FetcherExt, RateLimitedFetcher};

/// Single-URL content fetching.
///
/// All failure modes (timeout, navigation error, insufficient content)
/// are normalized to `None`; callers only see absence. At the 20-URL
/// fan-out scale individual failures are expected and non-fatal, so the
/// batch provides redundancy instead of per-URL retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one URL and reduce it to clean, size-bounded plain text.
    async fn fetch(&self, url: &str) -> Option<ScrapedContent>;

    /// Release any long-lived engine resources.
    ///
    /// Default is a no-op; the browser-backed fetcher tears down its
    /// rendering engine here. Must be called after a batch on every
    /// exit path.
    async fn shutdown(&self) {}
}
