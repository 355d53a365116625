//! Research request - the validated input to a pipeline run.

use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

/// Number of sub-objectives a request must carry.
pub const SUB_OBJECTIVE_COUNT: usize = 4;

/// A validated research request.
///
/// Created once per submission and immutable thereafter. Construction
/// trims all fields and rejects empty input before any external call
/// is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// Company being analyzed
    pub company_name: String,

    /// The general investment analysis objective
    pub general_objective: String,

    /// Exactly four research angles under the general objective
    pub sub_objectives: Vec<String>,
}

impl ResearchRequest {
    /// Build a request, validating the invariants.
    ///
    /// Fails if the company name or objective is empty, if the
    /// sub-objective count is not exactly four, or if any sub-objective
    /// is empty after trimming.
    pub fn new(
        company_name: impl Into<String>,
        general_objective: impl Into<String>,
        sub_objectives: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, ResearchError> {
        let company_name = company_name.into().trim().to_string();
        if company_name.is_empty() {
            return Err(ResearchError::InvalidRequest {
                reason: "company name is empty".to_string(),
            });
        }

        let general_objective = general_objective.into().trim().to_string();
        if general_objective.is_empty() {
            return Err(ResearchError::InvalidRequest {
                reason: "general objective is empty".to_string(),
            });
        }

        let sub_objectives: Vec<String> = sub_objectives
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .collect();

        if sub_objectives.len() != SUB_OBJECTIVE_COUNT {
            return Err(ResearchError::InvalidRequest {
                reason: format!(
                    "expected {} sub-objectives, got {}",
                    SUB_OBJECTIVE_COUNT,
                    sub_objectives.len()
                ),
            });
        }

        if let Some(idx) = sub_objectives.iter().position(|s| s.is_empty()) {
            return Err(ResearchError::InvalidRequest {
                reason: format!("sub-objective {} is empty", idx + 1),
            });
        }

        Ok(Self {
            company_name,
            general_objective,
            sub_objectives,
        })
    }
}
