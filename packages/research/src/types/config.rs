//! Configuration types for fetching, retries and prompt budgeting.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for single-page fetches.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Navigation deadline, measured to DOM-content-loaded
    pub navigation_timeout: Duration,

    /// Fixed delay after load for client-rendered content to materialize
    pub settle_delay: Duration,

    /// Fixed viewport width
    pub viewport_width: u32,

    /// Fixed viewport height
    pub viewport_height: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(2),
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl FetchConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the navigation timeout.
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set the post-load settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

/// Retry policy for external structured-generation calls.
///
/// Backoff grows as `base_delay * 2^attempt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts before giving up
    pub max_attempts: u32,

    /// Base backoff delay
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt bound.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the base backoff delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Backoff before the next attempt after `attempt` (0-based) failed.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Character budget for the combined extraction prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBudget {
    /// Hard cap across all concatenated source blocks, in characters
    pub max_total_chars: usize,

    /// A source is included truncated only if at least this much budget remains
    pub min_truncated_chars: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            max_total_chars: 80_000,
            min_truncated_chars: 1_000,
        }
    }
}

impl PromptBudget {
    /// Create a budget with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total character cap.
    pub fn with_max_total_chars(mut self, max: usize) -> Self {
        self.max_total_chars = max;
        self
    }
}
