//! Pipeline orchestration - sequencing the two stages over a request.
//!
//! Strictly sequential over the four sub-objectives: sub-objective
//! `i+1`'s stage-1 call never begins before `i`'s completes. That
//! simplifies failure bookkeeping at the cost of total latency; the
//! coordinator's fan-out is the only concurrency in a run.
//!
//! Failures are recovered at the smallest meaningful unit (one URL, one
//! sub-objective) and become counted, named absences in the aggregate
//! reports. The stage-1 aggregate is persisted before stage 2 begins,
//! and a wholesale stage-2 failure still returns stage-1 results.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

use crate::ai::Ai;
use crate::fetch::{BatchFetchCoordinator, Fetcher};
use crate::services::{InsightExtractionService, LinkProposalService};
use crate::store::ReportStore;
use crate::types::links::LinkRecommendation;
use crate::types::report::{Layer1Report, Layer2Report, PipelineOutcome};
use crate::types::request::ResearchRequest;

/// Per-sub-objective progress through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubObjectiveState {
    /// Not yet processed
    Pending,

    /// Stage 1 produced a valid recommendation
    LinksProposed,

    /// At least one proposed link was fetched
    ContentFetched,

    /// Stage 2 produced an analysis
    InsightsExtracted,

    /// Dropped at whichever stage failed
    Failed,
}

/// Orchestrates one full research run.
pub struct ResearchPipeline<A: Ai, F: Fetcher> {
    links: LinkProposalService<A>,
    insights: InsightExtractionService<A>,
    coordinator: BatchFetchCoordinator<F>,
    store: ReportStore,
}

impl<A: Ai + Clone, F: Fetcher + 'static> ResearchPipeline<A, F> {
    /// Wire a pipeline with default service configs.
    pub fn new(ai: A, fetcher: F, store: ReportStore) -> Self {
        Self {
            links: LinkProposalService::new(ai.clone()),
            insights: InsightExtractionService::new(ai),
            coordinator: BatchFetchCoordinator::new(fetcher),
            store,
        }
    }
}

impl<A: Ai, F: Fetcher + 'static> ResearchPipeline<A, F> {
    /// Wire a pipeline from explicitly configured components.
    pub fn with_components(
        links: LinkProposalService<A>,
        insights: InsightExtractionService<A>,
        coordinator: BatchFetchCoordinator<F>,
        store: ReportStore,
    ) -> Self {
        Self {
            links,
            insights,
            coordinator,
            store,
        }
    }

    /// Run both stages for a validated request.
    ///
    /// A run is atomic: no partial-run abort path exists. Per-operation
    /// timeouts fail single operations, never the whole run. The
    /// browsing engine is released on every exit path.
    pub async fn run(&self, request: &ResearchRequest) -> crate::error::Result<PipelineOutcome> {
        info!(
            company = %request.company_name,
            objective = %request.general_objective,
            "pipeline run starting"
        );

        // Stage 1: link proposal for every sub-objective
        let layer1 = self.run_stage1(request).await;
        debug_assert!(layer1.is_consistent());

        // Persist before stage 2 so a stage-2 crash never loses stage-1 work
        if let Err(e) = self.store.save_layer1(&layer1).await {
            self.coordinator.close().await;
            return Err(e);
        }

        // Stage 2 runs only for stage-1 survivors. An unwind anywhere
        // inside it is caught here so the persisted stage-1 results are
        // still handed back and the engine still released. Stage 2 keeps
        // no state across calls, so resuming after an unwind is sound.
        let layer2 = match AssertUnwindSafe(self.run_stage2(request, &layer1.research_results))
            .catch_unwind()
            .await
        {
            Ok(report) => {
                debug_assert!(report.is_consistent());
                Some(report)
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "opaque panic payload".to_string());
                error!(
                    detail = %detail,
                    "stage 2 failed wholesale; returning stage-1 results only"
                );
                None
            }
        };

        self.coordinator.close().await;

        info!(
            stage1_successful = layer1.successful,
            stage2_successful = layer2.as_ref().map(|r| r.successful),
            "pipeline run complete"
        );

        Ok(PipelineOutcome { layer1, layer2 })
    }

    async fn run_stage1(&self, request: &ResearchRequest) -> Layer1Report {
        let total = request.sub_objectives.len();
        let mut results = Vec::new();
        let mut failed_objectives = Vec::new();

        for (i, sub_objective) in request.sub_objectives.iter().enumerate() {
            info!(
                step = format!("{}/{total}", i + 1),
                sub_objective = %sub_objective,
                "proposing links"
            );

            match self
                .links
                .propose(&request.company_name, &request.general_objective, sub_objective)
                .await
            {
                Some(recommendation) => results.push(recommendation),
                None => failed_objectives.push(sub_objective.clone()),
            }
        }

        Layer1Report {
            company_name: request.company_name.clone(),
            general_objective: request.general_objective.clone(),
            total_sub_objectives: total,
            successful: results.len(),
            failed: failed_objectives.len(),
            failed_objectives,
            research_results: results,
        }
    }

    async fn run_stage2(
        &self,
        request: &ResearchRequest,
        survivors: &[LinkRecommendation],
    ) -> Layer2Report {
        let total = survivors.len();
        let mut results = Vec::new();
        let mut failed_sub_objectives = Vec::new();

        for (i, recommendation) in survivors.iter().enumerate() {
            let sub_objective = &recommendation.sub_objective;

            info!(
                step = format!("{}/{total}", i + 1),
                sub_objective = %sub_objective,
                links = recommendation.links.len(),
                state = ?SubObjectiveState::LinksProposed,
                "fetching proposed links"
            );

            let contents = self.coordinator.fetch_many(&recommendation.links).await;
            if !contents.is_empty() {
                info!(
                    sub_objective = %sub_objective,
                    sources = contents.len(),
                    state = ?SubObjectiveState::ContentFetched,
                    "content fetched"
                );
            }

            // extract() short-circuits on zero contents without an AI call
            let analysis = self
                .insights
                .extract(&request.general_objective, sub_objective, &contents)
                .await;

            let state = match analysis {
                Some(analysis) => {
                    results.push(analysis);
                    SubObjectiveState::InsightsExtracted
                }
                None => {
                    failed_sub_objectives.push(sub_objective.clone());
                    SubObjectiveState::Failed
                }
            };

            info!(sub_objective = %sub_objective, state = ?state, "sub-objective finished");
        }

        let report = Layer2Report {
            company_name: request.company_name.clone(),
            general_objective: request.general_objective.clone(),
            total_sub_objectives: total,
            successful: results.len(),
            failed: failed_sub_objectives.len(),
            failed_sub_objectives,
            analysis_results: results,
        };

        // The analysis already exists in memory; a failed snapshot is
        // logged, not allowed to discard the stage's results
        if let Err(e) = self.store.save_layer2(&report).await {
            warn!(error = %e, "failed to persist stage-2 report");
        }

        report
    }
}
