//! Link recommendation - the stage-1 structured output contract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of URLs a recommendation must contain.
pub const LINKS_PER_RECOMMENDATION: usize = 20;

/// Research link recommendations for one sub-objective.
///
/// The schema pins `links` to exactly 20 entries; the parser in
/// [`crate::services::links`] re-validates the count because a schema
/// round-trip is not trusted on its own.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LinkRecommendation {
    /// The general investment analysis objective, echoed back
    pub general_objective: String,

    /// The specific sub-objective being researched, echoed back
    pub sub_objective: String,

    /// Exactly 20 candidate research source URLs
    #[schemars(length(min = 20, max = 20))]
    pub links: Vec<String>,
}

impl LinkRecommendation {
    /// Check the exact-count invariant.
    pub fn has_exact_link_count(&self) -> bool {
        self.links.len() == LINKS_PER_RECOMMENDATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_link_count() {
        let rec = LinkRecommendation {
            general_objective: "Market".to_string(),
            sub_objective: "TAM".to_string(),
            links: (0..20).map(|i| format!("https://example.com/{i}")).collect(),
        };
        assert!(rec.has_exact_link_count());

        let short = LinkRecommendation {
            links: vec!["https://example.com".to_string()],
            ..rec
        };
        assert!(!short.has_exact_link_count());
    }
}
