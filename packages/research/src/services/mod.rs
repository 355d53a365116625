//! Service wrappers around the two AI calls.

pub mod insights;
pub mod links;
pub mod prompts;
pub mod retry;

pub use insights::InsightExtractionService;
pub use links::LinkProposalService;
pub use retry::RetryPolicy;
