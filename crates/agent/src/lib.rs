//! Recommendation runtime for omega-3 product comparisons.
//!
//! The crate turns a validated comparison into a final recommendation:
//! - Builds the generation prompt from the scored comparison (`prompt`)
//! - Calls a pluggable language model client (`llm`, `openai`, `anthropic`)
//! - Normalizes free-form model output into a structured result (`normalizer`)
//! - Falls back to the deterministic generator on any failure (`producer`)
//!
//! # Safety Principle
//!
//! The language model only phrases a recommendation. Metrics, scores and the
//! score-model winner are computed deterministically in `omegapick-core` and
//! are returned to the caller regardless of what the model says.

pub mod anthropic;
pub mod llm;
pub mod normalizer;
pub mod openai;
pub mod producer;
pub mod prompt;
pub mod runtime;

pub use llm::{client_from_config, DisabledLlm, LlmClient, LlmError};
pub use normalizer::{normalize, strip_code_fences, NormalizationFailure};
pub use producer::{
    Generated, LocalDeterministic, ProducerError, RecommendationProducer, RemoteGeneration,
};
pub use prompt::RecommendationRequestBuilder;
pub use runtime::ComparisonRuntime;
