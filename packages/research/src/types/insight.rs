//! Insight types - the stage-2 structured output contract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ceiling on a single piece's content, in characters.
pub const MAX_PIECE_CHARS: usize = 2_000;

/// Appended to content that was cut at the ceiling.
pub const TRUNCATION_MARKER: &str = "...";

/// Minimum pieces a valid extraction response must contain.
pub const MIN_PIECES: usize = 5;

/// Maximum pieces a valid extraction response may contain.
pub const MAX_PIECES: usize = 15;

/// One extracted insight, tied to its source URL.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InformationPiece {
    /// Extracted insight content, at most [`MAX_PIECE_CHARS`] characters
    pub content: String,

    /// Analyst-facing 0-100 trustworthiness rating
    #[schemars(range(min = 0, max = 100))]
    pub confidence_score: i64,

    /// The URL this insight was drawn from
    pub source_url: String,
}

impl InformationPiece {
    /// Enforce the content ceiling, truncating in place.
    ///
    /// The schema pins a string type but cannot express the length
    /// ceiling, so this second enforcement layer is mandatory. Over-long
    /// content becomes exactly [`MAX_PIECE_CHARS`] characters including
    /// the marker.
    pub fn enforce_content_ceiling(&mut self) {
        if self.content.chars().count() > MAX_PIECE_CHARS {
            let keep = MAX_PIECE_CHARS - TRUNCATION_MARKER.chars().count();
            let mut truncated: String = self.content.chars().take(keep).collect();
            truncated.push_str(TRUNCATION_MARKER);
            self.content = truncated;
        }
    }

    /// Check the confidence range invariant.
    pub fn confidence_in_range(&self) -> bool {
        (0..=100).contains(&self.confidence_score)
    }
}

/// Analysis results for one sub-objective.
///
/// Created only for sub-objectives that yielded at least one fetch
/// success and a successful extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubObjectiveAnalysis {
    /// The general investment analysis objective
    pub general_objective: String,

    /// The specific sub-objective analyzed
    pub sub_objective: String,

    /// Extracted insights with confidence scores
    pub information_pieces: Vec<InformationPiece>,

    /// Number of web sources that were successfully fetched
    pub scraped_sources_count: usize,
}
