//! Retry policy for external structured-generation calls.
//!
//! Consumes [`FailureKind`] rather than a catch-all error: every class
//! in the enum is transient at this boundary, so all are retried up to
//! the attempt bound with exponential backoff. Exhaustion degrades to
//! the last failure, which callers convert into absence for their unit
//! of work.

use std::future::Future;
use tracing::warn;

use crate::error::{AiResult, FailureKind};
use crate::types::config::RetryConfig;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy from a retry config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `operation` until it succeeds or attempts are exhausted.
    ///
    /// `label` names the unit of work in diagnostics.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> AiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AiResult<T>>,
    {
        let max = self.config.max_attempts.max(1);
        let mut last_failure = FailureKind::Transport("no attempts made".to_string());

        for attempt in 0..max {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    warn!(
                        label = %label,
                        attempt = attempt + 1,
                        max_attempts = max,
                        failure = %failure,
                        "attempt failed"
                    );
                    last_failure = failure;

                    if attempt + 1 < max {
                        tokio::time::sleep(self.config.backoff_for(attempt)).await;
                    }
                }
            }
        }

        warn!(label = %label, "all retries exhausted");
        Err(last_failure)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
