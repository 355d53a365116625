//! AI boundary - structured generation behind a provider-agnostic trait.
//!
//! The pipeline only ever needs one capability from an LLM provider:
//! prompt + JSON schema in, schema-conforming text out. Implementations
//! map every failure mode onto [`FailureKind`] so the retry policy works
//! against a closed set of failure classes.

pub mod openai;
pub mod schema;

use async_trait::async_trait;

use crate::error::AiResult;

pub use openai::OpenAiClient;
pub use schema::StructuredOutput;

/// Structured text generation.
///
/// Implementations wrap a specific provider (OpenAI here, mocks in
/// tests) and handle transport and response unwrapping. Schema
/// validation of the returned text belongs to the caller: the provider
/// promises conformance, the services re-validate.
#[async_trait]
pub trait Ai: Send + Sync {
    /// Issue one structured-generation request.
    ///
    /// Returns the raw response text, expected (but not guaranteed) to
    /// conform to `schema`. All failures collapse into a [`FailureKind`].
    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_name: &str,
        schema: serde_json::Value,
        temperature: f32,
        max_output_tokens: u32,
    ) -> AiResult<String>;
}
