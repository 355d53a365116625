//! Insight extraction service - the stage-2 AI call.
//!
//! Distills a bounded concatenation of fetched page texts into 5-15
//! confidence-scored insight pieces. The schema cannot express the
//! per-piece length ceiling, so post-processing enforces it a second
//! time.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

use crate::ai::{Ai, StructuredOutput};
use crate::error::FailureKind;
use crate::services::prompts::{budget_sources, insight_extraction_prompt, INSIGHT_EXTRACTION_PROMPT};
use crate::services::retry::RetryPolicy;
use crate::types::config::{PromptBudget, RetryConfig};
use crate::types::content::ScrapedContent;
use crate::types::insight::{
    InformationPiece, SubObjectiveAnalysis, MAX_PIECES, MIN_PIECES,
};

const TEMPERATURE: f32 = 0.5;
const MAX_OUTPUT_TOKENS: u32 = 4_000;

/// The structured-output contract for an extraction response.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InsightResponse {
    /// 5-15 extracted pieces
    #[schemars(length(min = 5, max = 15))]
    pub information_pieces: Vec<InformationPiece>,
}

/// Extracts insights from fetched content, one sub-objective at a time.
pub struct InsightExtractionService<A: Ai> {
    ai: A,
    retry: RetryPolicy,
    budget: PromptBudget,
}

impl<A: Ai> InsightExtractionService<A> {
    /// Create a service with default retry and budget.
    pub fn new(ai: A) -> Self {
        Self::with_config(ai, RetryConfig::default(), PromptBudget::default())
    }

    /// Create a service with specific retry and budget configs.
    pub fn with_config(ai: A, retry: RetryConfig, budget: PromptBudget) -> Self {
        Self {
            ai,
            retry: RetryPolicy::new(retry),
            budget,
        }
    }

    /// Extract insights for one sub-objective.
    ///
    /// Returns `None` immediately when `scraped_contents` is empty -
    /// there is nothing to analyze and an external call would waste
    /// quota on a guaranteed-degenerate answer. Otherwise retries the
    /// AI call with backoff and returns `None` on exhaustion.
    pub async fn extract(
        &self,
        general_objective: &str,
        sub_objective: &str,
        scraped_contents: &[ScrapedContent],
    ) -> Option<SubObjectiveAnalysis> {
        if scraped_contents.is_empty() {
            warn!(sub_objective = %sub_objective, "no content to analyze");
            return None;
        }

        let sources = budget_sources(scraped_contents, &self.budget);
        let user_prompt =
            insight_extraction_prompt(general_objective, sub_objective, &sources);
        let schema = InsightResponse::strict_schema();

        let result = self
            .retry
            .run("insight extraction", || {
                let schema = schema.clone();
                let user_prompt = user_prompt.clone();
                async move {
                    let raw = self
                        .ai
                        .generate_structured(
                            INSIGHT_EXTRACTION_PROMPT,
                            &user_prompt,
                            "information_extraction",
                            schema,
                            TEMPERATURE,
                            MAX_OUTPUT_TOKENS,
                        )
                        .await?;
                    parse_insights(&raw)
                }
            })
            .await;

        match result {
            Ok(pieces) => {
                info!(
                    sub_objective = %sub_objective,
                    pieces = pieces.len(),
                    sources = scraped_contents.len(),
                    "insight extraction succeeded"
                );
                Some(SubObjectiveAnalysis {
                    general_objective: general_objective.to_string(),
                    sub_objective: sub_objective.to_string(),
                    information_pieces: pieces,
                    scraped_sources_count: scraped_contents.len(),
                })
            }
            Err(failure) => {
                warn!(
                    sub_objective = %sub_objective,
                    failure = %failure,
                    "insight extraction gave up"
                );
                None
            }
        }
    }
}

/// Parse, re-validate and post-process an extraction response.
///
/// Piece count outside 5-15 or a confidence score outside 0-100 is a
/// schema violation and counts as a failed attempt. Over-long content
/// is truncated, not rejected.
fn parse_insights(raw: &str) -> Result<Vec<InformationPiece>, FailureKind> {
    let response: InsightResponse =
        serde_json::from_str(raw).map_err(|e| FailureKind::SchemaViolation(e.to_string()))?;

    let mut pieces = response.information_pieces;

    if !(MIN_PIECES..=MAX_PIECES).contains(&pieces.len()) {
        return Err(FailureKind::SchemaViolation(format!(
            "expected {MIN_PIECES}-{MAX_PIECES} pieces, got {}",
            pieces.len()
        )));
    }

    if let Some(bad) = pieces.iter().find(|p| !p.confidence_in_range()) {
        return Err(FailureKind::SchemaViolation(format!(
            "confidence score {} out of range",
            bad.confidence_score
        )));
    }

    for piece in &mut pieces {
        piece.enforce_content_ceiling();
    }

    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insight_response_json, MockAi};
    use crate::types::insight::{MAX_PIECE_CHARS, TRUNCATION_MARKER};
    use std::time::Duration;

    fn fast_retry() -> RetryConfig {
        RetryConfig::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(1))
    }

    fn service(ai: MockAi) -> InsightExtractionService<MockAi> {
        InsightExtractionService::with_config(ai, fast_retry(), PromptBudget::default())
    }

    fn contents(n: usize) -> Vec<ScrapedContent> {
        (0..n)
            .map(|i| {
                ScrapedContent::new(
                    format!("https://s{i}.example.com"),
                    "body text ".repeat(50),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits_without_ai_call() {
        let ai = MockAi::new();
        let svc = service(ai.clone());

        let analysis = svc.extract("Market", "TAM", &[]).await;
        assert!(analysis.is_none());
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extract_success() {
        let ai = MockAi::new().with_response(insight_response_json(6, 100));
        let svc = service(ai);

        let analysis = svc.extract("Market", "TAM", &contents(3)).await.unwrap();
        assert_eq!(analysis.information_pieces.len(), 6);
        assert_eq!(analysis.scraped_sources_count, 3);
        assert_eq!(analysis.sub_objective, "TAM");
    }

    #[tokio::test]
    async fn test_overlong_piece_truncated_to_ceiling() {
        let ai = MockAi::new().with_response(insight_response_json(5, 2_500));
        let svc = service(ai);

        let analysis = svc.extract("Market", "TAM", &contents(1)).await.unwrap();
        for piece in &analysis.information_pieces {
            assert_eq!(piece.content.chars().count(), MAX_PIECE_CHARS);
            assert!(piece.content.ends_with(TRUNCATION_MARKER));
        }
    }

    #[tokio::test]
    async fn test_too_few_pieces_is_schema_failure() {
        let ai = MockAi::new()
            .with_response(insight_response_json(2, 100))
            .with_response(insight_response_json(2, 100))
            .with_response(insight_response_json(2, 100));
        let svc = service(ai.clone());

        assert!(svc.extract("Market", "TAM", &contents(1)).await.is_none());
        assert_eq!(ai.call_count(), 3);
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_schema_failure() {
        let bad = serde_json::json!({
            "information_pieces": (0..5).map(|i| serde_json::json!({
                "content": "insight",
                "confidence_score": if i == 0 { 150 } else { 50 },
                "source_url": "https://example.com"
            })).collect::<Vec<_>>()
        })
        .to_string();

        let ai = MockAi::new()
            .with_response(bad)
            .with_response(insight_response_json(5, 100));
        let svc = service(ai);

        // Second attempt recovers
        let analysis = svc.extract("Market", "TAM", &contents(1)).await;
        assert!(analysis.is_some());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn piece_never_exceeds_ceiling(len in 0usize..6_000) {
                let mut piece = InformationPiece {
                    content: "x".repeat(len),
                    confidence_score: 50,
                    source_url: "https://example.com".to_string(),
                };
                piece.enforce_content_ceiling();
                prop_assert!(piece.content.chars().count() <= MAX_PIECE_CHARS);
                if len > MAX_PIECE_CHARS {
                    prop_assert_eq!(piece.content.chars().count(), MAX_PIECE_CHARS);
                    prop_assert!(piece.content.ends_with(TRUNCATION_MARKER));
                }
            }

            #[test]
            fn budget_never_exceeded(sizes in proptest::collection::vec(0usize..120_000, 0..8)) {
                let contents: Vec<ScrapedContent> = sizes
                    .iter()
                    .enumerate()
                    .map(|(i, n)| ScrapedContent::new(
                        format!("https://s{i}.example.com"),
                        "a".repeat(*n),
                    ))
                    .collect();

                let budget = PromptBudget::default();
                let included = budget_sources(&contents, &budget);
                let total: usize = included.iter().map(|s| s.content.chars().count()).sum();
                prop_assert!(total <= budget.max_total_chars);
            }
        }
    }
}
