//! Rate-limited fetcher wrapper.
//!
//! Wraps any [`Fetcher`] with a request-rate quota using the governor
//! crate, so the batch fan-out respects target-site load independently
//! of the concurrency cap.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::fetch::Fetcher;
use crate::types::content::ScrapedContent;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A fetcher wrapper that enforces a request-rate limit.
pub struct RateLimitedFetcher<F: Fetcher> {
    inner: F,
    limiter: Arc<DefaultRateLimiter>,
}

impl<F: Fetcher> RateLimitedFetcher<F> {
    /// Wrap a fetcher with a per-second request quota.
    pub fn new(fetcher: F, requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }

    /// Wrap with a custom quota.
    pub fn with_quota(fetcher: F, quota: Quota) -> Self {
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, url: &str) -> Option<ScrapedContent> {
        self.limiter.until_ready().await;
        self.inner.fetch(url).await
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await;
    }
}

/// Extension trait for easy rate limiting.
pub trait FetcherExt: Fetcher + Sized {
    /// Wrap this fetcher with a per-second rate limit.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedFetcher<Self> {
        RateLimitedFetcher::new(self, requests_per_second)
    }
}

impl<F: Fetcher + Sized> FetcherExt for F {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;
    use std::time::Instant;

    #[tokio::test]
    async fn test_rate_limiting_spaces_requests() {
        let mock = MockFetcher::new().with_default_content("enough content ".repeat(10));
        let fetcher = mock.rate_limited(2);

        let start = Instant::now();
        for i in 0..3 {
            let url = format!("https://example.com/{i}");
            assert!(fetcher.fetch(&url).await.is_some());
        }
        let elapsed = start.elapsed();

        // 3 requests at 2/sec: burst of 2 immediate, third waits ~0.5s
        assert!(
            elapsed.as_millis() >= 500,
            "rate limiting not applied: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_zero_rps_clamps_to_one() {
        let mock = MockFetcher::new().with_default_content("enough content ".repeat(10));
        let fetcher = RateLimitedFetcher::new(mock, 0);
        assert!(fetcher.fetch("https://example.com").await.is_some());
    }
}
