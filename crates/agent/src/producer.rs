use std::sync::Arc;

use async_trait::async_trait;
use omegapick_core::comparison::fallback::FallbackGenerator;
use omegapick_core::comparison::ComparisonContext;
use omegapick_core::domain::recommendation::RecommendationResult;
use thiserror::Error;
use tracing::debug;

use crate::llm::LlmClient;
use crate::normalizer::{normalize, NormalizationFailure};
use crate::prompt::RecommendationRequestBuilder;

/// A recommendation together with the text it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub recommendation: RecommendationResult,
    pub raw: String,
}

#[derive(Debug, Error)]
pub enum ProducerError {
    /// The generation service could not be reached or answered with an error.
    #[error("{0}")]
    Transport(String),
    /// The service answered but its text could not be normalized.
    #[error("LLM returned non-JSON: {failure}")]
    Format { failure: NormalizationFailure, raw: String },
}

#[async_trait]
pub trait RecommendationProducer: Send + Sync {
    async fn produce(&self, context: &ComparisonContext) -> Result<Generated, ProducerError>;

    fn name(&self) -> &str;
}

/// One prompt, one call, one normalization attempt. No retries.
pub struct RemoteGeneration {
    client: Arc<dyn LlmClient>,
    builder: RecommendationRequestBuilder,
}

impl RemoteGeneration {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client, builder: RecommendationRequestBuilder::new() }
    }
}

#[async_trait]
impl RecommendationProducer for RemoteGeneration {
    async fn produce(&self, context: &ComparisonContext) -> Result<Generated, ProducerError> {
        let prompt = self.builder.build(context);
        debug!(
            event_name = "recommendation.prompt.built",
            provider = self.client.provider_name(),
            chars = prompt.len(),
            "prompt built"
        );

        let raw = self
            .client
            .complete(&prompt)
            .await
            .map_err(|error| ProducerError::Transport(format!("{error:#}")))?;

        match normalize(&raw, context) {
            Ok(recommendation) => Ok(Generated { recommendation, raw }),
            Err(failure) => Err(ProducerError::Format { failure, raw }),
        }
    }

    fn name(&self) -> &str {
        self.client.provider_name()
    }
}

/// Deterministic producer backed by [`FallbackGenerator`]. Never fails.
#[derive(Clone, Debug, Default)]
pub struct LocalDeterministic {
    generator: FallbackGenerator,
}

impl LocalDeterministic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recommend(&self, context: &ComparisonContext) -> Generated {
        let recommendation = self.generator.generate(context);
        let raw = serde_json::to_string_pretty(&recommendation).unwrap_or_default();
        Generated { recommendation, raw }
    }
}

#[async_trait]
impl RecommendationProducer for LocalDeterministic {
    async fn produce(&self, context: &ComparisonContext) -> Result<Generated, ProducerError> {
        Ok(self.recommend(context))
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use omegapick_core::comparison::catalog::Catalog;
    use omegapick_core::comparison::{ComparisonContext, ComparisonEngine};
    use omegapick_core::domain::comparison::ValidatedRequest;
    use omegapick_core::domain::product::ProductKey;
    use omegapick_core::domain::profile::UserProfile;

    use super::{LocalDeterministic, ProducerError, RecommendationProducer, RemoteGeneration};
    use crate::llm::LlmClient;

    struct CannedLlm {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or_else(|| anyhow::anyhow!("connection reset by peer"))
        }

        fn provider_name(&self) -> &str {
            "canned"
        }
    }

    fn canned(reply: Option<&str>) -> Arc<CannedLlm> {
        Arc::new(CannedLlm { reply: reply.map(str::to_string), calls: AtomicUsize::new(0) })
    }

    fn context() -> ComparisonContext {
        ComparisonEngine::new(Arc::new(Catalog::builtin()))
            .prepare(ValidatedRequest {
                profile: UserProfile::default(),
                product_a: ProductKey::from("NOW Foods"),
                product_b: ProductKey::from("Sports Research"),
            })
            .expect("builtin keys resolve")
    }

    #[tokio::test]
    async fn remote_generation_keeps_raw_text_on_success() {
        let reply = "```json\n{\"winner\":\"NOW Foods\",\"reason\":\"More EPA.\"}\n```";
        let client = canned(Some(reply));
        let producer = RemoteGeneration::new(client.clone());

        let generated = producer.produce(&context()).await.expect("normalized");

        assert_eq!(generated.raw, reply);
        assert_eq!(generated.recommendation.winner, "NOW Foods");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_attempted_once() {
        let client = canned(None);
        let producer = RemoteGeneration::new(client.clone());

        let error = producer.produce(&context()).await.expect_err("transport failure");

        assert!(matches!(error, ProducerError::Transport(ref message) if message.contains("reset")));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn format_failure_carries_prefix_and_cleaned_text() {
        let producer = RemoteGeneration::new(canned(Some("```\nnot json at all\n```")));

        let error = producer.produce(&context()).await.expect_err("format failure");

        assert!(error.to_string().starts_with("LLM returned non-JSON: "));
        assert!(matches!(
            error,
            ProducerError::Format { ref failure, ref raw }
                if failure.cleaned == "not json at all" && raw.contains("not json at all")
        ));
    }

    #[tokio::test]
    async fn local_producer_renders_pretty_json() {
        let context = context();
        let generated = LocalDeterministic::new().produce(&context).await.expect("infallible");

        assert_eq!(generated.recommendation.winner, context.winner.as_str());
        let reparsed: serde_json::Value =
            serde_json::from_str(&generated.raw).expect("raw is json");
        assert_eq!(reparsed["winner"], "Sports Research");
        assert!(generated.raw.contains('\n'));
    }
}
