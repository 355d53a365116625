//! Two-Stage AI Investment Research Library
//!
//! Runs a fixed research pipeline for one company and objective:
//!
//! 1. **Link proposal** - an AI call per sub-objective proposing exactly
//!    20 research URLs against a strict structured-output schema.
//! 2. **Insight extraction** - concurrent, rate-limited browser fetching
//!    of the proposed URLs, then an AI call distilling the rendered page
//!    text into 5-15 confidence-scored insight pieces.
//!
//! # Design Philosophy
//!
//! **Degrade, don't abort**
//!
//! - A failed URL costs one source, not a sub-objective
//! - A failed sub-objective costs one analysis, not the run
//! - Every loss is counted and named in the stage reports
//! - Stage-1 results are persisted before stage 2 begins
//!
//! # Usage
//!
//! ```rust,ignore
//! use research::ai::OpenAiClient;
//! use research::fetch::{BrowserFetcher, FetcherExt};
//! use research::pipeline::ResearchPipeline;
//! use research::store::ReportStore;
//! use research::types::request::ResearchRequest;
//!
//! let request = ResearchRequest::new(
//!     "Acme Corp",
//!     "Assess the market opportunity",
//!     ["TAM", "Competitors", "Regulation", "Unit economics"],
//! )?;
//!
//! let ai = OpenAiClient::from_env()?;
//! let fetcher = BrowserFetcher::new().rate_limited(2);
//! let store = ReportStore::new("research_outputs");
//!
//! let outcome = ResearchPipeline::new(ai, fetcher, store).run(&request).await?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Domain types, reports and tunable configs
//! - [`ai`] - The [`ai::Ai`] seam and the OpenAI-backed implementation
//! - [`fetch`] - Browser fetching, rate limiting and batch coordination
//! - [`services`] - The two AI stages, prompts and retry policy
//! - [`pipeline`] - Orchestration of a full run
//! - [`store`] - Timestamped JSON report snapshots
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod services;
pub mod store;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{FailureKind, FetchError, ResearchError};
pub use pipeline::{ResearchPipeline, SubObjectiveState};
pub use store::ReportStore;
pub use types::report::{Layer1Report, Layer2Report, PipelineOutcome};
pub use types::request::ResearchRequest;
