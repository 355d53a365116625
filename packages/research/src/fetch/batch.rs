//! Batch fetch coordination - bounded fan-out over a URL list.
//!
//! Fans a list of URLs out to the fetcher under a counting admission
//! gate, collects only successes and drops failures silently (logged,
//! not escalated). Output order is not guaranteed to match input order;
//! callers must key results by URL.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::fetch::Fetcher;
use crate::types::content::ScrapedContent;

/// Default cap on in-flight fetches.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Coordinates concurrent fetches over one shared fetcher.
///
/// Owns the fetcher (and through it the browsing engine) for its
/// lifetime. [`close`](Self::close) must run after the batch on every
/// exit path so the engine is released.
pub struct BatchFetchCoordinator<F: Fetcher> {
    fetcher: Arc<F>,
    max_concurrent: usize,
}

impl<F: Fetcher + 'static> BatchFetchCoordinator<F> {
    /// Create a coordinator with the default concurrency cap.
    pub fn new(fetcher: F) -> Self {
        Self::with_concurrency(fetcher, DEFAULT_MAX_CONCURRENT)
    }

    /// Create a coordinator with a specific concurrency cap.
    pub fn with_concurrency(fetcher: F, max_concurrent: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch all URLs concurrently under the admission gate.
    ///
    /// Returns successes only, unordered. A single URL's failure never
    /// aborts its siblings. Duplicate page bodies (identical content
    /// hash) are dropped, keeping the first seen, so a mirror page
    /// cannot consume the extraction budget twice.
    pub async fn fetch_many(&self, urls: &[String]) -> Vec<ScrapedContent> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        let tasks = urls.iter().cloned().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("admission gate never closed");
                fetcher.fetch(&url).await
            })
        });

        let mut results = Vec::new();
        let mut seen_hashes: HashSet<String> = HashSet::new();

        for outcome in join_all(tasks).await {
            match outcome {
                Ok(Some(content)) => {
                    if seen_hashes.insert(content.content_hash.clone()) {
                        results.push(content);
                    } else {
                        debug!(url = %content.url, "dropping duplicate page body");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    // A panicked fetch task is isolated like any failure
                    warn!(error = %e, "fetch task aborted");
                }
            }
        }

        info!(
            requested = urls.len(),
            fetched = results.len(),
            "batch fetch complete"
        );
        results
    }

    /// Release the underlying engine.
    pub async fn close(&self) {
        self.fetcher.shutdown().await;
    }
}
