//! Aggregate batch reports for the two pipeline stages.
//!
//! Both reports are built once per run, persisted as JSON snapshots and
//! never mutated afterwards. Their counting invariant is
//! `successful + failed == total`, with the failed list naming exactly
//! the sub-objectives absent from the results.

use serde::{Deserialize, Serialize};

use super::insight::SubObjectiveAnalysis;
use super::links::LinkRecommendation;

/// Stage-1 aggregate: link proposal outcomes for all sub-objectives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer1Report {
    /// Company being analyzed
    pub company_name: String,

    /// The general investment analysis objective
    pub general_objective: String,

    /// Number of sub-objectives processed (always the request's 4)
    pub total_sub_objectives: usize,

    /// Sub-objectives with a valid 20-link recommendation
    pub successful: usize,

    /// Sub-objectives whose proposal exhausted all retries
    pub failed: usize,

    /// Names of the failed sub-objectives
    pub failed_objectives: Vec<String>,

    /// One recommendation per successful sub-objective, in request order
    pub research_results: Vec<LinkRecommendation>,
}

impl Layer1Report {
    /// Check the counting invariant.
    pub fn is_consistent(&self) -> bool {
        self.successful + self.failed == self.total_sub_objectives
            && self.failed_objectives.len() == self.failed
            && self.research_results.len() == self.successful
    }
}

/// Stage-2 aggregate: insight extraction outcomes for stage-1 survivors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer2Report {
    /// Company being analyzed
    pub company_name: String,

    /// The general investment analysis objective
    pub general_objective: String,

    /// Number of stage-1 survivors processed
    pub total_sub_objectives: usize,

    /// Sub-objectives with a successful extraction
    pub successful: usize,

    /// Sub-objectives with no fetchable content or an exhausted extraction
    pub failed: usize,

    /// Names of the failed sub-objectives
    pub failed_sub_objectives: Vec<String>,

    /// One analysis per successful sub-objective, in request order
    pub analysis_results: Vec<SubObjectiveAnalysis>,
}

impl Layer2Report {
    /// Check the counting invariant.
    pub fn is_consistent(&self) -> bool {
        self.successful + self.failed == self.total_sub_objectives
            && self.failed_sub_objectives.len() == self.failed
            && self.analysis_results.len() == self.successful
    }
}

/// The outcome of one full pipeline run.
///
/// Stage 1 is always present; stage 2 is absent when it failed wholesale
/// (stage-1 results survive regardless, already persisted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Stage-1 report
    pub layer1: Layer1Report,

    /// Stage-2 report, absent on a total stage-2 failure
    pub layer2: Option<Layer2Report>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer1_consistency() {
        let report = Layer1Report {
            company_name: "Acme".to_string(),
            general_objective: "Market".to_string(),
            total_sub_objectives: 4,
            successful: 3,
            failed: 1,
            failed_objectives: vec!["Pricing".to_string()],
            research_results: vec![],
        };
        // results length disagrees with successful
        assert!(!report.is_consistent());

        let empty_ok = Layer1Report {
            successful: 0,
            failed: 4,
            failed_objectives: vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
            ],
            research_results: vec![],
            ..report
        };
        assert!(empty_ok.is_consistent());
    }

    #[test]
    fn test_layer2_consistency() {
        let report = Layer2Report {
            company_name: "Acme".to_string(),
            general_objective: "Market".to_string(),
            total_sub_objectives: 3,
            successful: 2,
            failed: 1,
            failed_sub_objectives: vec!["Pricing".to_string()],
            analysis_results: vec![],
        };
        assert!(!report.is_consistent());
    }
}
