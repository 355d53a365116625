//! Testing utilities including mock implementations.
//!
//! These are useful for testing the pipeline without making real AI or
//! browser calls. `MockAi` serves scripted responses in FIFO order -
//! the pipeline is strictly sequential, so a queue scripts a whole run
//! deterministically.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::ai::Ai;
use crate::error::{AiResult, FailureKind};
use crate::fetch::Fetcher;
use crate::types::content::ScrapedContent;

/// Record of a call made to [`MockAi`].
#[derive(Debug, Clone)]
pub struct MockAiCall {
    /// Schema name the caller requested
    pub schema_name: String,

    /// Length of the user prompt, for budget assertions
    pub user_prompt_chars: usize,
}

/// A mock AI serving scripted responses in order.
#[derive(Clone, Default)]
pub struct MockAi {
    responses: Arc<RwLock<VecDeque<AiResult<String>>>>,
    calls: Arc<RwLock<Vec<MockAiCall>>>,
}

impl MockAi {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful raw response.
    pub fn with_response(self, raw: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(Ok(raw.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, failure: FailureKind) -> Self {
        self.responses.write().unwrap().push_back(Err(failure));
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<MockAiCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl Ai for MockAi {
    async fn generate_structured(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        schema_name: &str,
        _schema: serde_json::Value,
        _temperature: f32,
        _max_output_tokens: u32,
    ) -> AiResult<String> {
        self.calls.write().unwrap().push(MockAiCall {
            schema_name: schema_name.to_string(),
            user_prompt_chars: user_prompt.chars().count(),
        });

        self.responses
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FailureKind::Transport(
                    "mock script exhausted".to_string(),
                ))
            })
    }
}

/// A valid stage-1 response body with exactly 20 links.
pub fn link_response_json(general_objective: &str, sub_objective: &str) -> String {
    let links: Vec<String> = (0..20)
        .map(|i| format!("https://source{i}.example.com/report"))
        .collect();
    serde_json::json!({
        "general_objective": general_objective,
        "sub_objective": sub_objective,
        "links": links,
    })
    .to_string()
}

/// A valid stage-2 response body with `pieces` pieces of `piece_chars` each.
pub fn insight_response_json(pieces: usize, piece_chars: usize) -> String {
    let pieces: Vec<serde_json::Value> = (0..pieces)
        .map(|i| {
            serde_json::json!({
                "content": "i".repeat(piece_chars),
                "confidence_score": 60 + (i % 40),
                "source_url": format!("https://source{i}.example.com/report"),
            })
        })
        .collect();
    serde_json::json!({ "information_pieces": pieces }).to_string()
}

/// A mock fetcher returning predefined content without a browser.
#[derive(Clone, Default)]
pub struct MockFetcher {
    contents: Arc<RwLock<HashMap<String, String>>>,
    default_content: Arc<RwLock<Option<String>>>,
    fail_urls: Arc<RwLock<Vec<String>>>,
    fail_all: Arc<RwLock<bool>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<RwLock<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockFetcher {
    /// Create a mock with no predefined content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Predefine content for a URL.
    pub fn with_content(self, url: impl Into<String>, content: impl Into<String>) -> Self {
        self.contents
            .write()
            .unwrap()
            .insert(url.into(), content.into());
        self
    }

    /// Serve this content for any URL without predefined content.
    ///
    /// The URL is appended so each page body stays distinct; tests that
    /// exercise de-duplication predefine identical bodies explicitly.
    pub fn with_default_content(self, content: impl Into<String>) -> Self {
        *self.default_content.write().unwrap() = Some(content.into());
        self
    }

    /// Mark a URL as failing.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Fail every fetch.
    pub fn fail_all(self) -> Self {
        *self.fail_all.write().unwrap() = true;
        self
    }

    /// Sleep this long inside each fetch, to observe concurrency.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap() = Some(delay);
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches made so far.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Handle to the highest observed in-flight fetch count.
    pub fn peak_in_flight_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.peak_in_flight)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Option<ScrapedContent> {
        self.calls.write().unwrap().push(url.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if *self.fail_all.read().unwrap()
            || self.fail_urls.read().unwrap().contains(&url.to_string())
        {
            return None;
        }

        if let Some(content) = self.contents.read().unwrap().get(url) {
            return Some(ScrapedContent::new(url, content.clone()));
        }

        let default = self.default_content.read().unwrap().clone();
        default.map(|content| ScrapedContent::new(url, format!("{content} [{url}]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ai_serves_in_order() {
        let ai = MockAi::new()
            .with_response("first")
            .with_failure(FailureKind::RateLimited)
            .with_response("second");

        assert_eq!(
            ai.generate_structured("s", "u", "n", serde_json::json!({}), 0.0, 10)
                .await
                .unwrap(),
            "first"
        );
        assert!(matches!(
            ai.generate_structured("s", "u", "n", serde_json::json!({}), 0.0, 10)
                .await,
            Err(FailureKind::RateLimited)
        ));
        assert_eq!(
            ai.generate_structured("s", "u", "n", serde_json::json!({}), 0.0, 10)
                .await
                .unwrap(),
            "second"
        );
        assert_eq!(ai.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_ai_exhausted_script_fails() {
        let ai = MockAi::new();
        let result = ai
            .generate_structured("s", "u", "n", serde_json::json!({}), 0.0, 10)
            .await;
        assert!(matches!(result, Err(FailureKind::Transport(_))));
    }

    #[tokio::test]
    async fn test_mock_fetcher_predefined_and_failing() {
        let fetcher = MockFetcher::new()
            .with_content("https://example.com/a", "alpha content")
            .fail_url("https://example.com/b");

        let a = fetcher.fetch("https://example.com/a").await.unwrap();
        assert_eq!(a.content, "alpha content");

        assert!(fetcher.fetch("https://example.com/b").await.is_none());
        // No default content configured
        assert!(fetcher.fetch("https://example.com/c").await.is_none());
        assert_eq!(fetcher.call_count(), 3);
    }

    #[test]
    fn test_canned_responses_are_valid() {
        let links: serde_json::Value =
            serde_json::from_str(&link_response_json("Market", "TAM")).unwrap();
        assert_eq!(links["links"].as_array().unwrap().len(), 20);

        let insights: serde_json::Value =
            serde_json::from_str(&insight_response_json(7, 50)).unwrap();
        assert_eq!(insights["information_pieces"].as_array().unwrap().len(), 7);
    }
}
