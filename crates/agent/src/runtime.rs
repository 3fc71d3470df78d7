use std::sync::Arc;

use omegapick_core::comparison::{ComparisonEngine, RecommendationOutcome};
use omegapick_core::domain::comparison::{ComparisonRequest, ComparisonResponse};
use omegapick_core::errors::{ApplicationError, DomainError};
use tracing::{info, warn};

use crate::llm::LlmClient;
use crate::producer::{LocalDeterministic, ProducerError, RecommendationProducer, RemoteGeneration};

/// Runs one comparison end to end: validate, score, generate, fall back.
pub struct ComparisonRuntime {
    engine: ComparisonEngine,
    producer: Arc<dyn RecommendationProducer>,
    fallback: LocalDeterministic,
}

impl ComparisonRuntime {
    pub fn new(engine: ComparisonEngine, producer: Arc<dyn RecommendationProducer>) -> Self {
        Self { engine, producer, fallback: LocalDeterministic::new() }
    }

    pub fn with_client(engine: ComparisonEngine, client: Arc<dyn LlmClient>) -> Self {
        Self::new(engine, Arc::new(RemoteGeneration::new(client)))
    }

    pub fn engine(&self) -> &ComparisonEngine {
        &self.engine
    }

    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    pub async fn compare(
        &self,
        request: ComparisonRequest,
        correlation_id: &str,
    ) -> Result<ComparisonResponse, ApplicationError> {
        let validated = request.validate()?;
        let context = self.engine.prepare(validated).map_err(|error| match error {
            DomainError::InvariantViolation(message) => ApplicationError::Internal(message),
            other => ApplicationError::Domain(other),
        })?;

        info!(
            event_name = "comparison.scored",
            correlation_id,
            product_a = %context.first.key,
            product_b = %context.second.key,
            score_a = context.first.score,
            score_b = context.second.score,
            winner = %context.winner,
            "comparison scored"
        );

        let outcome = match self.producer.produce(&context).await {
            Ok(generated) => RecommendationOutcome {
                recommendation: generated.recommendation,
                raw: generated.raw,
                used_fallback: false,
                generation_error: None,
            },
            Err(error) => {
                warn!(
                    event_name = "comparison.fallback",
                    correlation_id,
                    producer = self.producer.name(),
                    error = %error,
                    "generation failed, using deterministic recommendation"
                );
                let generated = self.fallback.recommend(&context);
                let raw = match &error {
                    ProducerError::Format { failure, raw } if failure.cleaned.is_empty() => {
                        raw.clone()
                    }
                    ProducerError::Format { failure, .. } => failure.cleaned.clone(),
                    ProducerError::Transport(_) => generated.raw,
                };
                RecommendationOutcome {
                    recommendation: generated.recommendation,
                    raw,
                    used_fallback: true,
                    generation_error: Some(error.to_string()),
                }
            }
        };

        info!(
            event_name = "comparison.completed",
            correlation_id,
            used_fallback = outcome.used_fallback,
            recommended = %outcome.recommendation.winner,
            "comparison completed"
        );

        Ok(context.into_response(outcome, self.engine.beta_notice()))
    }
}
