//! Link proposal service - the stage-1 AI call.
//!
//! One structured-generation request per sub-objective against the
//! strict 20-URL schema. Liveness of the proposed URLs is deliberately
//! not checked here; link proposal stays a pure ideation stage and dead
//! links are the fetcher's concern.

use tracing::{info, warn};

use crate::ai::{Ai, StructuredOutput};
use crate::error::FailureKind;
use crate::services::prompts::{link_proposal_prompt, LINK_PROPOSAL_PROMPT};
use crate::services::retry::RetryPolicy;
use crate::types::config::RetryConfig;
use crate::types::links::{LinkRecommendation, LINKS_PER_RECOMMENDATION};

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 4_096;

/// Proposes research links for one sub-objective at a time.
pub struct LinkProposalService<A: Ai> {
    ai: A,
    retry: RetryPolicy,
}

impl<A: Ai> LinkProposalService<A> {
    /// Create a service with the default retry policy.
    pub fn new(ai: A) -> Self {
        Self::with_retry(ai, RetryConfig::default())
    }

    /// Create a service with a specific retry config.
    pub fn with_retry(ai: A, retry: RetryConfig) -> Self {
        Self {
            ai,
            retry: RetryPolicy::new(retry),
        }
    }

    /// Propose exactly 20 research links for a sub-objective.
    ///
    /// Any failure - transport, rate limit, malformed or miscounted
    /// response - is retried with backoff; exhaustion returns `None`
    /// and the sub-objective is recorded failed by the caller.
    pub async fn propose(
        &self,
        company_name: &str,
        general_objective: &str,
        sub_objective: &str,
    ) -> Option<LinkRecommendation> {
        let user_prompt = link_proposal_prompt(company_name, general_objective, sub_objective);
        let schema = LinkRecommendation::strict_schema();

        let result = self
            .retry
            .run("link proposal", || {
                let schema = schema.clone();
                let user_prompt = user_prompt.clone();
                async move {
                    let raw = self
                        .ai
                        .generate_structured(
                            LINK_PROPOSAL_PROMPT,
                            &user_prompt,
                            "link_recommendation",
                            schema,
                            TEMPERATURE,
                            MAX_OUTPUT_TOKENS,
                        )
                        .await?;
                    parse_recommendation(&raw)
                }
            })
            .await;

        match result {
            Ok(recommendation) => {
                info!(
                    sub_objective = %sub_objective,
                    links = recommendation.links.len(),
                    "link proposal succeeded"
                );
                Some(recommendation)
            }
            Err(failure) => {
                warn!(
                    sub_objective = %sub_objective,
                    failure = %failure,
                    "link proposal gave up"
                );
                None
            }
        }
    }
}

/// Parse and re-validate a raw link recommendation response.
///
/// The provider promises schema conformance; this does not trust it.
/// A count other than exactly 20 is a schema violation and counts as a
/// failed attempt, never a partial success.
fn parse_recommendation(raw: &str) -> Result<LinkRecommendation, FailureKind> {
    let recommendation: LinkRecommendation = serde_json::from_str(raw)
        .map_err(|e| FailureKind::SchemaViolation(e.to_string()))?;

    if !recommendation.has_exact_link_count() {
        return Err(FailureKind::SchemaViolation(format!(
            "expected {} links, got {}",
            LINKS_PER_RECOMMENDATION,
            recommendation.links.len()
        )));
    }

    if recommendation.links.iter().any(|l| l.trim().is_empty()) {
        return Err(FailureKind::SchemaViolation(
            "empty link in recommendation".to_string(),
        ));
    }

    Ok(recommendation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{link_response_json, MockAi};
    use std::time::Duration;

    fn fast_retry() -> RetryConfig {
        RetryConfig::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_propose_success() {
        let ai = MockAi::new().with_response(link_response_json("Market", "TAM"));
        let service = LinkProposalService::with_retry(ai, fast_retry());

        let rec = service.propose("Acme", "Market", "TAM").await.unwrap();
        assert_eq!(rec.links.len(), 20);
        assert_eq!(rec.sub_objective, "TAM");
    }

    #[tokio::test]
    async fn test_wrong_count_is_retried_then_absent() {
        let short = serde_json::json!({
            "general_objective": "Market",
            "sub_objective": "TAM",
            "links": ["https://example.com"]
        })
        .to_string();

        let ai = MockAi::new()
            .with_response(short.clone())
            .with_response(short.clone())
            .with_response(short);
        let service = LinkProposalService::with_retry(ai, fast_retry());

        let rec = service.propose("Acme", "Market", "TAM").await;
        assert!(rec.is_none());
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let ai = MockAi::new()
            .with_failure(FailureKind::RateLimited)
            .with_failure(FailureKind::Transport("reset".to_string()))
            .with_response(link_response_json("Market", "TAM"));
        let service = LinkProposalService::with_retry(ai.clone(), fast_retry());

        let rec = service.propose("Acme", "Market", "TAM").await;
        assert!(rec.is_some());
        assert_eq!(ai.call_count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_json_exhausts_retries() {
        let ai = MockAi::new()
            .with_response("not json".to_string())
            .with_response("{\"links\":".to_string())
            .with_response("[]".to_string());
        let service = LinkProposalService::with_retry(ai.clone(), fast_retry());

        assert!(service.propose("Acme", "Market", "TAM").await.is_none());
        assert_eq!(ai.call_count(), 3);
    }
}
