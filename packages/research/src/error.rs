//! Typed errors for the research pipeline.
//!
//! `thiserror` enums throughout the library; `anyhow` stays in the
//! binary. External-call wrappers return `FailureKind` so the retry
//! policy consumes a closed set of failure classes instead of a
//! catch-all exception.

use thiserror::Error;

/// Errors that can occur during a pipeline run.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Request rejected before any external call
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// AI call exhausted its retries
    #[error("AI call failed: {0}")]
    Ai(#[from] FailureKind),

    /// Report persistence failed
    #[error("storage error: {0}")]
    Storage(#[source] std::io::Error),

    /// Report serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (missing credential, bad output path)
    #[error("config error: {0}")]
    Config(String),
}

/// Failure classes for external structured-generation calls.
///
/// Every failure mode of the AI boundary collapses into one of these
/// four variants. The retry policy treats all of them as retryable;
/// the distinction exists for diagnostics and backoff tuning.
#[derive(Debug, Clone, Error)]
pub enum FailureKind {
    /// Network or HTTP-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response did not conform to the requested schema
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Provider signalled rate limiting (HTTP 429)
    #[error("rate limited")]
    RateLimited,

    /// Request exceeded its deadline
    #[error("request timed out")]
    Timeout,
}

/// Errors that can occur fetching a single URL.
///
/// These never propagate past the fetcher: the batch coordinator only
/// sees absence. They exist so failure causes show up in logs.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Not a parseable http(s) URL; never sent to the browser
    #[error("invalid url: {url}")]
    InvalidUrl { url: String },

    /// Navigation did not reach DOM-content-loaded within the deadline
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Browser-level navigation or protocol failure
    #[error("navigation failed for {url}: {details}")]
    Navigation { url: String, details: String },

    /// Extracted text was below the minimum viable length
    #[error("insufficient content from {url}: {chars} chars")]
    InsufficientContent { url: String, chars: usize },

    /// Browser engine could not be started
    #[error("browser engine error: {0}")]
    Engine(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Result type alias for external AI calls.
pub type AiResult<T> = std::result::Result<T, FailureKind>;

/// Result type alias for single-URL fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
